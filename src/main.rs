use anyhow::Result;

use kou_grade_fetch::app::KouManager;
use kou_grade_fetch::config::Config;
use kou_grade_fetch::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::load();

    // 运行交互式应用
    let mut manager = KouManager::new(config);
    manager.run().await
}
