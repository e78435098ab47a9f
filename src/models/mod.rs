//! 数据模型
//!
//! 采集结果、会话文件、缓存文件的数据结构定义

pub mod cache;
pub mod course;
pub mod session;

pub use cache::{CacheEnvelope, CacheInfo, CacheMetadata};
pub use course::{CourseActivity, CourseInfo, SemesterData, SemesterMap, SemesterOption};
pub use session::{LoginCredentials, SessionCookie, SessionInfo};
