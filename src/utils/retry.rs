//! 有界重试策略
//!
//! 登录重试、会话加载重试等都用同一个显式策略对象，
//! 不在各调用点散落魔法数字

use std::time::Duration;

/// 固定次数 + 固定退避间隔的重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// 尝试序号迭代器（从 1 开始）
    pub fn attempts(&self) -> impl Iterator<Item = usize> {
        1..=self.max_attempts
    }

    /// 本次尝试之后是否还有机会
    pub fn has_next(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }

    /// 两次尝试之间的等待
    pub async fn pause(&self) {
        tokio::time::sleep(self.backoff).await;
    }
}
