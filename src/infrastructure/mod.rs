//! 基础设施层
//!
//! 持有稀缺资源（Page），只暴露能力。

pub mod driver;
pub mod scripted;

pub use driver::{PortalDriver, UiDriver, DEFAULT_TIMEOUT_MS};
pub use scripted::ScriptedDriver;
