//! 流程层
//!
//! 登录流程和成绩采集流程的编排，只依赖驱动接口和业务能力，
//! 不直接持有浏览器资源

pub mod collect_flow;
pub mod extract;
pub mod login_flow;

pub use collect_flow::GradeCollector;
pub use login_flow::{classify_page, Authenticator, LoginSignal};
