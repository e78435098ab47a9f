//! chromiumoxide 驱动实现
//!
//! 唯一的 Browser / Page 持有者，其余模块只通过 [`PortalDriver`] 接口访问

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{ClearBrowserCookiesParams, CookieParam};
use chromiumoxide::{Browser, Page};
use serde_json::Value as JsonValue;
use tokio::task::JoinHandle;
use tracing::debug;

use super::driver::PortalDriver;
use crate::error::Result;
use crate::models::SessionCookie;

/// 基于 Chrome DevTools 协议的门户驱动
pub struct ChromiumDriver {
    browser: tokio::sync::Mutex<Browser>,
    page: Page,
    handler_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumDriver {
    /// 包装已启动的浏览器实例
    ///
    /// `handler_task` 是后台事件循环句柄，quit 时一并收尾
    pub fn new(browser: Browser, page: Page, handler_task: JoinHandle<()>) -> Self {
        Self {
            browser: tokio::sync::Mutex::new(browser),
            page,
            handler_task: std::sync::Mutex::new(Some(handler_task)),
        }
    }

    /// 页面引用（仅供启动阶段做一次性设置）
    pub fn page(&self) -> &Page {
        &self.page
    }
}

#[async_trait]
impl PortalDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn eval(&self, js: &str) -> Result<JsonValue> {
        let result = self.page.evaluate(js.to_string()).await?;
        let value = result.into_value()?;
        Ok(value)
    }

    async fn element_count(&self, css: &str) -> Result<usize> {
        // 选择器无匹配按 0 处理，与查询失败不作区分
        match self.page.find_elements(css).await {
            Ok(elements) => Ok(elements.len()),
            Err(e) => {
                debug!("元素查询失败 ({}): {}", css, e);
                Ok(0)
            }
        }
    }

    async fn click(&self, css: &str) -> Result<()> {
        let element = self.page.find_element(css).await?;
        element.click().await?;
        Ok(())
    }

    async fn type_into(&self, css: &str, text: &str) -> Result<()> {
        let element = self.page.find_element(css).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<SessionCookie>> {
        let cookies = self.page.get_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|c| SessionCookie {
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                secure: c.secure,
                http_only: c.http_only,
            })
            .collect())
    }

    async fn inject_cookies(&self, cookies: &[SessionCookie]) -> Result<usize> {
        let mut injected = 0;
        for cookie in cookies {
            let param = match CookieParam::builder()
                .name(&cookie.name)
                .value(&cookie.value)
                .domain(&cookie.domain)
                .path(&cookie.path)
                .secure(cookie.secure)
                .http_only(cookie.http_only)
                .build()
            {
                Ok(param) => param,
                Err(e) => {
                    debug!("Cookie 构造失败 ({}): {}", cookie.name, e);
                    continue;
                }
            };

            // 单个被拒绝的 Cookie 跳过，剩余的继续注入
            match self.page.set_cookies(vec![param]).await {
                Ok(_) => injected += 1,
                Err(e) => debug!("Cookie 注入被拒绝 ({}): {}", cookie.name, e),
            }
        }
        Ok(injected)
    }

    async fn clear_cookies(&self) -> Result<()> {
        self.page
            .execute(ClearBrowserCookiesParams::default())
            .await?;
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        let _ = browser.close().await;
        let task = self
            .handler_task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            let _ = task.await;
        }
        debug!("浏览器已关闭");
        Ok(())
    }
}
