use serde::Deserialize;
use std::path::Path;

/// 程序配置
///
/// 优先级：默认值 < `kou_config.toml` < 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 登录页 URL
    pub login_url: String,
    /// 登录后的主页 URL
    pub main_page_url: String,
    /// 会话文件存放目录
    pub session_dir: String,
    /// 用户数据缓存目录
    pub data_dir: String,
    /// 是否无头模式（reCAPTCHA 需要可见浏览器，交互式登录时必须为 false）
    pub headless: bool,
    /// 浏览器 User-Agent
    pub user_agent: String,
    /// 元素等待默认超时（秒）
    pub default_timeout_secs: u64,
    /// 页面加载超时（秒）
    pub page_load_timeout_secs: u64,
    /// 等待用户完成 reCAPTCHA 的上限（秒）
    pub captcha_wait_secs: u64,
    /// 登录状态轮询间隔（毫秒）
    pub login_poll_interval_ms: u64,
    /// 课程详情弹窗等待超时（秒），详情面板要么很快出现要么基本不存在
    pub modal_wait_secs: u64,
    /// 会话有效期（小时）
    pub session_ttl_hours: i64,
    /// 交互式登录最大尝试次数
    pub max_login_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_url: "https://ogr.kocaeli.edu.tr/KOUBS/ogrenci/index.cfm".to_string(),
            main_page_url: "https://ogr.kocaeli.edu.tr/KOUBS/Ogrenci/AnaGiris.cfm".to_string(),
            session_dir: ".kou_sessions".to_string(),
            data_dir: ".kou_sessions/data".to_string(),
            headless: false,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/137.0.7151.41 Safari/537.36"
                .to_string(),
            default_timeout_secs: 15,
            page_load_timeout_secs: 30,
            captcha_wait_secs: 180,
            login_poll_interval_ms: 1500,
            modal_wait_secs: 2,
            session_ttl_hours: 2,
            max_login_attempts: 2,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → 配置文件 → 环境变量
    pub fn load() -> Self {
        let base = Self::from_file("kou_config.toml").unwrap_or_default();
        base.apply_env()
    }

    /// 从 TOML 配置文件读取，文件不存在或解析失败时返回 None
    pub fn from_file(path: impl AsRef<Path>) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("配置文件解析失败，使用默认配置: {}", e);
                None
            }
        }
    }

    /// 用环境变量覆盖当前配置
    pub fn apply_env(mut self) -> Self {
        if let Some(v) = env_parse("KOU_HEADLESS") {
            self.headless = v;
        }
        if let Some(v) = env_parse("KOU_TIMEOUT") {
            self.default_timeout_secs = v;
        }
        if let Some(v) = env_parse("KOU_CAPTCHA_WAIT") {
            self.captcha_wait_secs = v;
        }
        if let Ok(v) = std::env::var("KOU_SESSION_DIR") {
            self.session_dir = v;
        }
        if let Ok(v) = std::env::var("KOU_DATA_DIR") {
            self.data_dir = v;
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_portal_urls() {
        let config = Config::default();
        assert!(config.login_url.contains("index.cfm"));
        assert!(config.main_page_url.contains("AnaGiris.cfm"));
        assert_eq!(config.session_ttl_hours, 2);
        assert_eq!(config.max_login_attempts, 2);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        assert!(Config::from_file("no_such_config.toml").is_none());
    }
}
