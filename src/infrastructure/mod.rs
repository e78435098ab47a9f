//! 基础设施层
//!
//! 持有稀缺资源（浏览器页面），只向上层暴露能力

pub mod chromium;
pub mod driver;

pub use chromium::ChromiumDriver;
pub use driver::{wait_for_element, PortalDriver};
