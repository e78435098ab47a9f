//! 错误类型定义
//!
//! 按故障域划分错误：登录、会话、导航、提取、持久化。
//! 约定：单门课程/单个学期的提取失败在 workflow 层内部吞掉，
//! 不向上传播；导航和登录失败终止当前顶层操作，以布尔结果返回。

use thiserror::Error;

/// 采集流程错误类型
#[derive(Debug, Error)]
pub enum CollectError {
    /// 身份验证失败（密码错误、reCAPTCHA 未在限时内完成、登录表单缺失）
    #[error("登录失败: {reason}")]
    Authentication { reason: String },

    /// 会话失效（过期 / 损坏 / 无法读取的会话文件）
    ///
    /// 总是可恢复：回退到交互式登录
    #[error("会话无效: {reason}")]
    SessionInvalid { reason: String },

    /// 导航失败（预期的页面或容器始终没有出现）
    #[error("导航失败 ({url}): {reason}")]
    Navigation { url: String, reason: String },

    /// 提取失败（单个表格 / 课程解析失败）
    #[error("数据提取失败 ({context}): {reason}")]
    Extraction { context: String, reason: String },

    /// 持久化失败（缓存或会话文件读写错误）
    #[error("文件读写失败 ({path}): {source}")]
    Persistence {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 浏览器协议错误（CDP 调用失败）
    #[error("浏览器操作失败: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// JSON 序列化 / 反序列化失败
    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

impl CollectError {
    /// 创建导航失败错误
    pub fn navigation(url: impl Into<String>, reason: impl Into<String>) -> Self {
        CollectError::Navigation {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// 创建提取失败错误
    pub fn extraction(context: impl Into<String>, reason: impl Into<String>) -> Self {
        CollectError::Extraction {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// 创建持久化失败错误
    pub fn persistence(path: impl Into<String>, source: std::io::Error) -> Self {
        CollectError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// 创建会话失效错误
    pub fn session_invalid(reason: impl Into<String>) -> Self {
        CollectError::SessionInvalid {
            reason: reason.into(),
        }
    }
}

/// 采集流程结果类型
pub type Result<T> = std::result::Result<T, CollectError>;
