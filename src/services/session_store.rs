//! 会话存储
//!
//! 把登录成功后的 Cookie 存到磁盘，下次运行直接复用，跳过 reCAPTCHA。
//! 每个用户两个文件：Cookie 列表 + 会话元数据（保存时间、过期时间）。
//! 两个文件必须同时存在且都能解析才算有效会话，写入中断留下的
//! 半套文件一律按无会话处理。

use chrono::{DateTime, Duration as ChronoDuration, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{CollectError, Result};
use crate::infrastructure::PortalDriver;
use crate::models::{SessionCookie, SessionInfo};
use crate::utils::fsio;
use crate::utils::hash::identity_hash;

/// 单个用户的会话文件管理器
pub struct SessionStore {
    username: String,
    cookie_file: PathBuf,
    info_file: PathBuf,
    ttl_hours: i64,
}

impl SessionStore {
    pub fn new(username: &str, session_dir: impl AsRef<Path>, ttl_hours: i64) -> Self {
        let dir = session_dir.as_ref();
        let hash = identity_hash(username);
        Self {
            username: username.to_string(),
            cookie_file: dir.join(format!("{}_cookies.json", hash)),
            info_file: dir.join(format!("{}_session.json", hash)),
            ttl_hours,
        }
    }

    /// 保存会话 Cookie 和元数据
    ///
    /// 先写 Cookie 再写元数据；中间崩溃留下的状态会被
    /// [`has_valid_session`](Self::has_valid_session) 保守地判为无效
    pub fn save_cookies(&self, cookies: &[SessionCookie]) -> bool {
        match self.write_artifacts(cookies) {
            Ok(()) => {
                debug!("会话已保存: {} 个 Cookie", cookies.len());
                true
            }
            Err(e) => {
                warn!("会话保存失败: {}", e);
                false
            }
        }
    }

    fn write_artifacts(&self, cookies: &[SessionCookie]) -> Result<()> {
        let now = Local::now();
        let info = SessionInfo {
            username: self.username.clone(),
            saved_at: now.to_rfc3339(),
            expires_at: (now + ChronoDuration::hours(self.ttl_hours)).to_rfc3339(),
        };

        fsio::write_atomic(&self.cookie_file, &serde_json::to_vec(cookies)?)?;
        fsio::write_atomic(&self.info_file, &serde_json::to_vec(&info)?)?;
        Ok(())
    }

    /// 是否存在未过期的有效会话
    ///
    /// 文件缺失、解析失败、已过期都返回 false，绝不报错
    pub fn has_valid_session(&self) -> bool {
        if !self.cookie_file.exists() || !self.info_file.exists() {
            return false;
        }

        // Cookie 文件也必须能干净解析，半套文件按无会话处理
        if self.read_cookies().is_err() {
            return false;
        }

        let Ok(info) = self.read_info() else {
            return false;
        };
        let Ok(expires_at) = DateTime::parse_from_rfc3339(&info.expires_at) else {
            return false;
        };

        Local::now() < expires_at.with_timezone(&Local)
    }

    /// 把保存的 Cookie 注入到浏览器会话
    ///
    /// 返回成功注入的数量，被门户拒绝的单个 Cookie 跳过
    pub async fn load_cookies<D: PortalDriver + ?Sized>(&self, driver: &D) -> Result<usize> {
        if !self.has_valid_session() {
            return Err(CollectError::session_invalid("没有有效的已保存会话"));
        }

        let cookies = self.read_cookies()?;
        let injected = driver.inject_cookies(&cookies).await?;
        info!("已注入 {}/{} 个 Cookie", injected, cookies.len());
        Ok(injected)
    }

    /// 删除会话文件，重复调用安全
    pub fn clear_session(&self) {
        fsio::remove_quiet(&self.cookie_file);
        fsio::remove_quiet(&self.info_file);
        debug!("会话文件已清除");
    }

    fn read_cookies(&self) -> Result<Vec<SessionCookie>> {
        let content = std::fs::read_to_string(&self.cookie_file)
            .map_err(|e| CollectError::persistence(self.cookie_file.display().to_string(), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn read_info(&self) -> Result<SessionInfo> {
        let content = std::fs::read_to_string(&self.info_file)
            .map_err(|e| CollectError::persistence(self.info_file.display().to_string(), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Cookie 文件路径
    pub fn cookie_file(&self) -> &Path {
        &self.cookie_file
    }

    /// 会话元数据文件路径
    pub fn info_file(&self) -> &Path {
        &self.info_file
    }
}
