//! 测试用假驱动
//!
//! 用脚本化的页面状态替代真实浏览器：URL、页面源码、元素数量、
//! 按 JS 片段匹配的求值应答都由测试预先写好

// 各测试二进制只用到本模块的一部分
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use kou_grade_fetch::error::Result;
use kou_grade_fetch::infrastructure::PortalDriver;
use kou_grade_fetch::models::SessionCookie;

/// 假驱动的可变状态
#[derive(Default)]
pub struct FakeState {
    pub url: String,
    pub source: String,
    pub cookies: Vec<SessionCookie>,
    /// 选择器 → 元素数量
    pub element_counts: HashMap<String, usize>,
    /// (JS 片段标记, 应答队列)；队列耗尽后重复最后一个应答
    pub eval_responses: Vec<(String, VecDeque<JsonValue>)>,
    pub eval_log: Vec<String>,
    pub clicks: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub navigations: Vec<String>,
    pub injected: Vec<SessionCookie>,
    pub cookies_cleared: usize,
    pub quit_called: bool,
}

impl FakeState {
    pub fn set_count(&mut self, css: &str, count: usize) {
        self.element_counts.insert(css.to_string(), count);
    }

    /// 固定应答：匹配到标记的每次求值都返回同一个值
    pub fn on_eval(&mut self, marker: &str, value: JsonValue) {
        self.eval_responses
            .push((marker.to_string(), VecDeque::from(vec![value])));
    }

    /// 序列应答：依次弹出，耗尽后重复最后一个
    pub fn on_eval_seq(&mut self, marker: &str, values: Vec<JsonValue>) {
        self.eval_responses
            .push((marker.to_string(), VecDeque::from(values)));
    }
}

pub struct FakeDriver {
    pub state: Mutex<FakeState>,
}

impl FakeDriver {
    pub fn new(state: FakeState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// 匹配标记的求值发生了多少次
    pub fn eval_count(&self, marker: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .eval_log
            .iter()
            .filter(|js| js.contains(marker))
            .count()
    }

    pub fn typed_values(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().typed.clone()
    }

    pub fn injected_cookies(&self) -> Vec<SessionCookie> {
        self.state.lock().unwrap().injected.clone()
    }
}

#[async_trait]
impl PortalDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().source.clone())
    }

    async fn eval(&self, js: &str) -> Result<JsonValue> {
        let mut state = self.state.lock().unwrap();
        state.eval_log.push(js.to_string());
        for (marker, queue) in state.eval_responses.iter_mut() {
            if js.contains(marker.as_str()) {
                let value = if queue.len() > 1 {
                    queue.pop_front().unwrap()
                } else {
                    queue.front().cloned().unwrap_or(JsonValue::Null)
                };
                return Ok(value);
            }
        }
        Ok(JsonValue::Null)
    }

    async fn element_count(&self, css: &str) -> Result<usize> {
        Ok(*self
            .state
            .lock()
            .unwrap()
            .element_counts
            .get(css)
            .unwrap_or(&0))
    }

    async fn click(&self, css: &str) -> Result<()> {
        self.state.lock().unwrap().clicks.push(css.to_string());
        Ok(())
    }

    async fn type_into(&self, css: &str, text: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .typed
            .push((css.to_string(), text.to_string()));
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<SessionCookie>> {
        Ok(self.state.lock().unwrap().cookies.clone())
    }

    async fn inject_cookies(&self, cookies: &[SessionCookie]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.injected.extend_from_slice(cookies);
        Ok(cookies.len())
    }

    async fn clear_cookies(&self) -> Result<()> {
        self.state.lock().unwrap().cookies_cleared += 1;
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        self.state.lock().unwrap().quit_called = true;
        Ok(())
    }
}

/// 测试用 Cookie
pub fn sample_cookie(name: &str, value: &str) -> SessionCookie {
    SessionCookie {
        name: name.to_string(),
        value: value.to_string(),
        domain: "ogr.kocaeli.edu.tr".to_string(),
        path: "/".to_string(),
        secure: true,
        http_only: true,
    }
}
