use serde::{Deserialize, Serialize};

use super::course::SemesterMap;

/// 缓存文件元数据
///
/// 计数在写入时重新计算，读取时仅作展示参考，不作为正确性依据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub username: String,
    /// 写入时刻（epoch 秒，浮点）
    pub last_updated: f64,
    /// 缓存结构版本号
    pub version: String,
    pub total_semesters: usize,
    pub total_courses: usize,
}

/// 缓存文件整体结构：`{metadata, semesters}`
///
/// 顶层形状解析失败即视为损坏文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub metadata: CacheMetadata,
    pub semesters: SemesterMap,
}

/// 缓存文件概要信息（供展示用的廉价快照）
#[derive(Debug, Clone, Default)]
pub struct CacheInfo {
    pub file_size: u64,
    /// 文件系统修改时间（epoch 秒）
    pub last_modified: Option<f64>,
    /// 元数据里的写入时刻，解析失败时为 None
    pub last_updated: Option<f64>,
    pub version: Option<String>,
    /// None 表示未知（元数据不可读时的降级结果）
    pub total_semesters: Option<usize>,
    pub total_courses: Option<usize>,
}
