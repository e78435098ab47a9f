//! 浏览器启动
//!
//! reCAPTCHA 必须由人工完成，交互式登录时浏览器以可见模式启动

use anyhow::Result;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::infrastructure::ChromiumDriver;

/// 启动浏览器并打开门户登录页
pub async fn launch_portal_browser(config: &Config) -> Result<ChromiumDriver> {
    info!("正在启动浏览器...");

    let mut builder = BrowserConfig::builder();
    if config.headless {
        builder = builder.new_headless_mode();
    } else {
        builder = builder.with_head();
    }

    let browser_config = builder
        .request_timeout(Duration::from_secs(config.page_load_timeout_secs))
        .args(vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--disable-extensions".to_string(),
            format!("--user-agent={}", config.user_agent),
        ])
        .build()
        .map_err(|e| {
            error!("浏览器配置失败: {}", e);
            anyhow::anyhow!("浏览器配置失败: {}", e)
        })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        anyhow::anyhow!("启动浏览器失败: {}", e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    let page = browser.new_page(config.login_url.as_str()).await.map_err(|e| {
        error!("打开登录页失败: {}", e);
        anyhow::anyhow!("打开登录页失败: {}", e)
    })?;

    // 抹掉 navigator.webdriver 标记，门户的反自动化脚本会检查它
    let _ = page
        .evaluate(
            "Object.defineProperty(navigator, 'webdriver', {get: () => undefined}); true",
        )
        .await;

    info!("浏览器已打开登录页: {}", config.login_url);

    Ok(ChromiumDriver::new(browser, page, handler_task))
}
