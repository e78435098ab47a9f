use serde::{Deserialize, Serialize};

/// 用户登录凭证
///
/// 只在一次登录尝试期间持有，绝不落盘
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// 持久化的浏览器 Cookie
///
/// 对我们来说是不透明令牌，除注入回浏览器外不做任何解释
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

/// 会话元数据文件内容
///
/// 时间以 RFC 3339 字符串存储，解析失败视为会话无效
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub username: String,
    pub saved_at: String,
    pub expires_at: String,
}
