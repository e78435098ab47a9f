//! 登录流程
//!
//! 先尝试复用已保存的会话（跳过 reCAPTCHA），失效时回退到
//! 交互式登录：填写凭证，等待用户在浏览器里手工完成 reCAPTCHA。
//!
//! 登录与否只能通过页面内容间接判断，判定结果显式分为
//! 正向 / 负向 / 未知三档，未知时再做一次 DOM 探测，
//! 仍无结论则按未登录处理（宁可重登，不可误判已登录）。

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::{wait_for_element, PortalDriver};
use crate::models::LoginCredentials;
use crate::services::SessionStore;
use crate::utils::retry::RetryPolicy;

/// 页面加载后的稳定等待
const PAGE_SETTLE: Duration = Duration::from_millis(1500);
/// 短稳定等待
const SHORT_SETTLE: Duration = Duration::from_millis(1000);
/// 元素轮询间隔
const POLL: Duration = Duration::from_millis(300);

/// 登录状态判定信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginSignal {
    /// 已登录
    Positive,
    /// 明确未登录（登录页、验证码、登录表单可见）
    Negative,
    /// 文本信号不足，需要 DOM 探测
    Unknown,
}

/// 仅登录后出现的页面文本标记
const POSITIVE_MARKERS: [&str; 4] = [
    "Çıkış",
    "DersIslemleri",
    "Ders İşlemleri",
    "OgrenciBilgileri",
];

/// 根据 URL 和页面内容判定登录状态
///
/// 正向与负向信号同时出现时正向优先（门户登录页不会渲染
/// 登录后的菜单标识，反向误报的代价更高）
pub fn classify_page(current_url: &str, page_source: &str, username: &str) -> LoginSignal {
    let positive = current_url.contains("AnaGiris.cfm")
        || POSITIVE_MARKERS.iter().any(|m| page_source.contains(m))
        || (!username.is_empty() && page_source.contains(username));
    if positive {
        return LoginSignal::Positive;
    }

    let negative = current_url.to_lowercase().contains("login.cfm")
        || page_source.to_lowercase().contains("oturum açma")
        || page_source.contains("reCAPTCHA")
        || (page_source.contains("OgrNo") && page_source.contains("Sifre"));
    if negative {
        return LoginSignal::Negative;
    }

    LoginSignal::Unknown
}

/// 一次交互式登录尝试的结局
enum AttemptOutcome {
    Success,
    /// 限时内登录状态始终没有转正
    Timeout,
    /// 登录表单字段缺失（瞬时结构故障，刷新后重试）
    FormMissing,
}

/// 登录流程编排器
pub struct Authenticator<'a, D: PortalDriver + ?Sized> {
    driver: &'a D,
    config: &'a Config,
}

impl<'a, D: PortalDriver + ?Sized> Authenticator<'a, D> {
    pub fn new(driver: &'a D, config: &'a Config) -> Self {
        Self { driver, config }
    }

    /// 带会话管理的登录入口
    ///
    /// 最终结果只有成功 / 失败，内部错误全部记录日志后折算为失败
    pub async fn login_with_session(&self, credentials: &LoginCredentials) -> bool {
        let store = SessionStore::new(
            &credentials.username,
            &self.config.session_dir,
            self.config.session_ttl_hours,
        );

        if store.has_valid_session() {
            info!("发现已保存的会话，正在加载...");
            match self.try_saved_session(&store, credentials).await {
                Ok(true) => {
                    info!("已保存的会话登录成功!");
                    return true;
                }
                Ok(false) => {
                    info!("已保存的会话已失效，转为交互式登录...");
                    store.clear_session();
                    self.back_to_login_page().await;
                }
                Err(e) => {
                    debug!("会话加载出错: {}", e);
                    info!("会话信息不可用，将重新登录...");
                    store.clear_session();
                    self.back_to_login_page().await;
                }
            }
        } else {
            // 过期或残缺的会话文件直接清掉，绝不尝试加载
            store.clear_session();
        }

        self.interactive_login(&store, credentials).await
    }

    /// 注入保存的 Cookie 并验证登录状态
    async fn try_saved_session(
        &self,
        store: &SessionStore,
        credentials: &LoginCredentials,
    ) -> Result<bool> {
        store.load_cookies(self.driver).await?;
        self.driver.navigate(&self.config.main_page_url).await?;
        tokio::time::sleep(PAGE_SETTLE).await;
        Ok(self.check_login_status(&credentials.username).await)
    }

    /// 登录状态检查
    ///
    /// URL 读不到直接判未登录；文本信号不足时探测登录后才有的菜单元素
    pub async fn check_login_status(&self, username: &str) -> bool {
        let Ok(current_url) = self.driver.current_url().await else {
            return false;
        };
        let page_source = self.driver.page_source().await.unwrap_or_default();

        match classify_page(&current_url, &page_source, username) {
            LoginSignal::Positive => true,
            LoginSignal::Negative => false,
            LoginSignal::Unknown => {
                let menu = self.driver.element_count("#DersIslemleri").await.unwrap_or(0);
                let profile = self
                    .driver
                    .element_count("#OgrenciBilgileri")
                    .await
                    .unwrap_or(0);
                menu > 0 || profile > 0
            }
        }
    }

    /// 交互式登录，最多尝试固定次数
    async fn interactive_login(&self, store: &SessionStore, credentials: &LoginCredentials) -> bool {
        if self.config.headless {
            error!("reCAPTCHA 需要可见浏览器，无头模式下无法交互式登录!");
            return false;
        }

        let policy = RetryPolicy::new(
            self.config.max_login_attempts,
            Duration::from_secs(1),
        );

        for attempt in policy.attempts() {
            match self.login_attempt(store, credentials, attempt).await {
                Ok(AttemptOutcome::Success) => return true,
                Ok(AttemptOutcome::Timeout) => {
                    if policy.has_next(attempt) {
                        warn!("登录等待超时，清除 Cookie 后重试...");
                        let _ = self.driver.clear_cookies().await;
                        self.back_to_login_page().await;
                        policy.pause().await;
                    } else {
                        error!("登录等待超时，请稍后再试");
                    }
                }
                Ok(AttemptOutcome::FormMissing) => {
                    if policy.has_next(attempt) {
                        warn!("登录表单未就绪，刷新页面重试...");
                        self.back_to_login_page().await;
                        policy.pause().await;
                    } else {
                        error!("登录表单始终未出现");
                    }
                }
                // 尝试中的其他错误记录后计为一次失败，不向外抛
                Err(e) => {
                    warn!("登录尝试 {} 出错: {}", attempt, e);
                    if policy.has_next(attempt) {
                        self.back_to_login_page().await;
                        policy.pause().await;
                    }
                }
            }
        }

        false
    }

    /// 单次交互式登录尝试
    async fn login_attempt(
        &self,
        store: &SessionStore,
        credentials: &LoginCredentials,
        attempt: usize,
    ) -> Result<AttemptOutcome> {
        debug!("正在连接登录页面 (尝试 {})...", attempt);

        let current_url = self.driver.current_url().await.unwrap_or_default();
        if !current_url.contains(&self.config.login_url) {
            self.driver.navigate(&self.config.login_url).await?;
            tokio::time::sleep(PAGE_SETTLE).await;
        }

        let form_timeout = Duration::from_secs(self.config.default_timeout_secs);
        if !wait_for_element(self.driver, "#OgrNo", form_timeout, POLL).await
            || self.driver.element_count("#Sifre").await.unwrap_or(0) == 0
        {
            return Ok(AttemptOutcome::FormMissing);
        }

        // 清空旧值再键入凭证
        let _ = self
            .driver
            .eval("document.getElementById('OgrNo').value = ''; document.getElementById('Sifre').value = ''; true")
            .await;
        self.driver.type_into("#OgrNo", &credentials.username).await?;
        self.driver.type_into("#Sifre", &credentials.password).await?;

        if attempt == 1 {
            info!("请在浏览器中完成 reCAPTCHA 并提交登录...");
        } else {
            info!("请再次完成 reCAPTCHA 并提交登录...");
        }

        if !self.wait_for_login(&credentials.username).await {
            return Ok(AttemptOutcome::Timeout);
        }

        // 等页面稳定后复核一次
        tokio::time::sleep(PAGE_SETTLE).await;
        if !self.check_login_status(&credentials.username).await {
            warn!("登录状态复核未通过");
            return Ok(AttemptOutcome::Timeout);
        }

        info!("登录成功!");

        if store.save_cookies(&self.driver.cookies().await?) {
            debug!("会话信息已保存");
        }

        // 确保最终停在主页上
        let current_url = self.driver.current_url().await.unwrap_or_default();
        if !current_url.contains("AnaGiris.cfm") {
            self.driver.navigate(&self.config.main_page_url).await?;
            tokio::time::sleep(SHORT_SETTLE).await;
        }

        Ok(AttemptOutcome::Success)
    }

    /// 限时等待登录状态转正，周期性复查而非持续轮询
    async fn wait_for_login(&self, username: &str) -> bool {
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.config.captcha_wait_secs);
        let poll = Duration::from_millis(self.config.login_poll_interval_ms);

        loop {
            if self.check_login_status(username).await {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(poll).await;
        }
    }

    async fn back_to_login_page(&self) {
        let _ = self.driver.navigate(&self.config.login_url).await;
        tokio::time::sleep(SHORT_SETTLE).await;
    }
}
