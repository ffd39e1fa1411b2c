//! 业务能力层
//!
//! 每个服务负责一项单订单能力：定位、提取、填表、分配、审计、会话。
//! 服务只依赖 `UiDriver` 抽象，不持有浏览器资源。

pub mod audit_client;
pub mod audit_emitter;
pub mod date_reconciler;
pub mod form_filler;
pub mod form_filler_ins_s;
pub mod form_filler_sts;
pub mod order_allocator;
pub mod order_extractor;
pub mod order_locator;
pub mod retry;
pub mod session;

pub use audit_client::{AuditStore, HttpAuditStore, MemoryAuditStore};
pub use audit_emitter::AuditEmitter;
pub use form_filler::WizardState;
pub use form_filler_ins_s::InsSFormFiller;
pub use form_filler_sts::StsFormFiller;
pub use order_allocator::OrderAllocator;
pub use order_extractor::{InsSExtractor, StsExtractor};
pub use order_locator::OrderLocator;
