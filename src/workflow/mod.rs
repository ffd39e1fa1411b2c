//! 流程层
//!
//! 定义单个订单的阶段编排，不持有资源。

pub mod order_ctx;
pub mod order_flow;

pub use order_ctx::OrderCtx;
pub use order_flow::OrderFlow;
