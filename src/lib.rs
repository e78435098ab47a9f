//! # KOU Grade Fetch
//!
//! 科贾埃利大学（KOU）学生信息系统的成绩采集工具：
//! 驱动浏览器完成带 reCAPTCHA 的登录，复用会话避免重复验证，
//! 批量提取各学期课程成绩和成绩构成，落盘缓存供离线查看。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器页面），只暴露能力
//! - `PortalDriver` - 驱动接口：导航、查元素、执行 JS、Cookie 读写
//! - `ChromiumDriver` - 唯一的 Browser / Page owner（chromiumoxide 实现）
//! - `browser/` - 浏览器进程启动
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，各自独占对应磁盘文件
//! - `SessionStore` - 会话存取能力（Cookie + 有效期元数据）
//! - `UserDataCache` - 用户数据缓存能力（损坏检测、概要嗅探）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义登录和采集的完整流程
//! - `Authenticator` - 会话复用 → 交互式登录 → 状态判定
//! - `GradeCollector` - 导航 → 学期枚举 → 批量提取 → 详情补全
//!
//! ### ④ 编排层（App）
//! - `app.rs` - 终端交互前端，只消费核心的公开操作

pub mod app;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::launch_portal_browser;
pub use config::Config;
pub use error::{CollectError, Result};
pub use infrastructure::{ChromiumDriver, PortalDriver};
pub use models::{CourseActivity, CourseInfo, LoginCredentials, SemesterData, SemesterMap};
pub use services::{SessionStore, UserDataCache};
pub use workflow::{Authenticator, GradeCollector};
