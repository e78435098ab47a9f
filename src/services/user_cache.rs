//! 用户数据缓存
//!
//! 采集结果整体写入一个 JSON 文件，供离线快速查看。
//! 与会话不同，缓存数据没有有效期：在用户主动刷新之前一直可用。
//! 读取时发现空文件或结构损坏的文件会就地删除并报告"无缓存"。

use chrono::Local;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{CacheEnvelope, CacheInfo, CacheMetadata, SemesterMap};
use crate::utils::fsio;
use crate::utils::hash::identity_hash;

/// 元数据嗅探窗口：只读文件头部这么多字节来确认 metadata 块存在
const METADATA_SNIFF_BYTES: usize = 512;

/// 按用户标识组织的磁盘缓存
pub struct UserDataCache {
    data_dir: PathBuf,
}

impl UserDataCache {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// 用户对应的缓存文件路径
    fn file_path(&self, username: &str) -> PathBuf {
        self.data_dir
            .join(format!("user_{}.json", identity_hash(username)))
    }

    /// 保存采集结果
    ///
    /// 计数在此处重新统计后写入元数据；整体覆盖旧文件，没有增量更新
    pub fn save(&self, username: &str, data: &SemesterMap) -> bool {
        let envelope = CacheEnvelope {
            metadata: CacheMetadata {
                username: username.to_string(),
                last_updated: Local::now().timestamp_millis() as f64 / 1000.0,
                version: env!("CARGO_PKG_VERSION").to_string(),
                total_semesters: data.len(),
                total_courses: data.total_courses(),
            },
            semesters: data.clone(),
        };

        let path = self.file_path(username);
        let result: Result<()> = (|| {
            let json = serde_json::to_vec_pretty(&envelope)?;
            fsio::write_atomic(&path, &json)?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                info!(
                    "数据已缓存: {} 个学期, {} 门课程",
                    envelope.metadata.total_semesters, envelope.metadata.total_courses
                );
                true
            }
            Err(e) => {
                warn!("缓存写入失败: {}", e);
                false
            }
        }
    }

    /// 读取缓存的采集结果
    ///
    /// 零字节文件和顶层结构损坏的文件视为损坏：删除并返回 None
    pub fn load(&self, username: &str) -> Option<SemesterMap> {
        let path = self.file_path(username);
        if !path.exists() {
            return None;
        }

        let size = fs::metadata(&path).ok()?.len();
        if size == 0 {
            debug!("发现空缓存文件，删除");
            fsio::remove_quiet(&path);
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("缓存读取失败: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEnvelope>(&content) {
            Ok(envelope) => {
                debug!(
                    "缓存已加载: {} 个学期, {} 门课程",
                    envelope.metadata.total_semesters, envelope.metadata.total_courses
                );
                Some(envelope.semesters)
            }
            Err(e) => {
                warn!("缓存结构损坏 ({})，删除", e);
                fsio::remove_quiet(&path);
                None
            }
        }
    }

    /// 是否存在非空缓存文件（不做任何解析）
    pub fn exists(&self, username: &str) -> bool {
        let path = self.file_path(username);
        fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false)
    }

    /// 缓存概要信息
    ///
    /// 先嗅探文件头确认 metadata 块，再做完整解析；
    /// 解析失败时降级为仅文件系统信息（计数未知）
    pub fn info(&self, username: &str) -> Option<CacheInfo> {
        let path = self.file_path(username);
        let meta = fs::metadata(&path).ok()?;

        let mut snapshot = CacheInfo {
            file_size: meta.len(),
            last_modified: meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs_f64()),
            ..Default::default()
        };

        if self.sniff_has_metadata(&path) {
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(envelope) = serde_json::from_str::<CacheEnvelope>(&content) {
                    snapshot.last_updated = Some(envelope.metadata.last_updated);
                    snapshot.version = Some(envelope.metadata.version);
                    snapshot.total_semesters = Some(envelope.metadata.total_semesters);
                    snapshot.total_courses = Some(envelope.metadata.total_courses);
                }
            }
        }

        Some(snapshot)
    }

    /// 删除缓存文件；返回是否真的删了东西
    pub fn clear(&self, username: &str) -> bool {
        let path = self.file_path(username);
        if path.exists() {
            fsio::remove_quiet(&path);
            debug!("缓存已清除");
            true
        } else {
            false
        }
    }

    fn sniff_has_metadata(&self, path: &Path) -> bool {
        let Ok(mut file) = fs::File::open(path) else {
            return false;
        };
        let mut head = vec![0u8; METADATA_SNIFF_BYTES];
        let Ok(n) = file.read(&mut head) else {
            return false;
        };
        String::from_utf8_lossy(&head[..n]).contains("\"metadata\"")
    }
}
