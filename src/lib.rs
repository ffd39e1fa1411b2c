//! # Order Auto Register
//!
//! 一个在两个门户之间自动转录与分配工单的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PortalDriver` - 唯一的 page owner，实现 `UiDriver` 能力集
//! - `ScriptedDriver` - 测试替身，不依赖真实浏览器
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个订单
//! - `OrderLocator` - 结果表定位能力
//! - `StsExtractor` / `InsSExtractor` - 详情页提取能力
//! - `StsFormFiller` / `InsSFormFiller` - 目的门户向导录入能力
//! - `OrderAllocator` - 来源门户排期能力
//! - `AuditEmitter` / `AuditStore` - 审计日志能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个订单"的三个阶段
//! - `OrderCtx` - 上下文封装（order_nr + 批次索引 + 缓冲天数）
//! - `OrderFlow` - 阶段编排（提取 → 录入 → 分配），错误在阶段边界
//!   转成审计日志
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量订单处理器，管理资源与终止策略
//! - `orchestrator/order_processor` - 单个订单处理器，串起三个阶段
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod portal;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use infrastructure::{PortalDriver, UiDriver};
pub use models::{AuditLogEntry, OrderBatchResult, OrderRecord, OrderType, Stage};
pub use orchestrator::App;
pub use workflow::{OrderCtx, OrderFlow};
