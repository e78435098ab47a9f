//! 门户浏览器驱动接口
//!
//! 登录和采集逻辑只依赖这个接口，不直接接触 chromiumoxide，
//! 测试时可以用假驱动替换真实浏览器

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::error::Result;
use crate::models::SessionCookie;

/// 浏览器驱动能力集合
///
/// 一个驱动实例对应一个浏览器页面，所有操作严格串行调用
#[async_trait]
pub trait PortalDriver: Send + Sync {
    /// 导航到指定 URL 并等待加载完成
    async fn navigate(&self, url: &str) -> Result<()>;

    /// 当前页面 URL
    async fn current_url(&self) -> Result<String>;

    /// 当前页面 HTML 源码
    async fn page_source(&self) -> Result<String>;

    /// 执行一段 JS 并返回 JSON 结果
    async fn eval(&self, js: &str) -> Result<JsonValue>;

    /// 匹配选择器的元素数量
    async fn element_count(&self, css: &str) -> Result<usize>;

    /// 点击第一个匹配的元素
    async fn click(&self, css: &str) -> Result<()>;

    /// 向第一个匹配的元素键入文本
    async fn type_into(&self, css: &str, text: &str) -> Result<()>;

    /// 读取当前会话的全部 Cookie
    async fn cookies(&self) -> Result<Vec<SessionCookie>>;

    /// 注入 Cookie，返回成功注入的数量
    ///
    /// 被拒绝的单个 Cookie 跳过而非报错，门户通常容忍部分注入
    async fn inject_cookies(&self, cookies: &[SessionCookie]) -> Result<usize>;

    /// 清除全部 Cookie
    async fn clear_cookies(&self) -> Result<()>;

    /// 关闭浏览器，释放资源
    ///
    /// 所有退出路径（成功、失败、中断）都必须走到这里
    async fn quit(&self) -> Result<()>;
}

/// 轮询等待某个元素出现
///
/// 超时返回 false，不报错；所有等待都有上界
pub async fn wait_for_element<D: PortalDriver + ?Sized>(
    driver: &D,
    css: &str,
    timeout: Duration,
    poll: Duration,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if matches!(driver.element_count(css).await, Ok(n) if n > 0) {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(poll).await;
    }
}
