//! 编排层
//!
//! 持有浏览器等资源，驱动批次内的订单严格串行处理。

pub mod batch_processor;
pub mod order_processor;

pub use batch_processor::App;
