pub mod audit;
pub mod batch;
pub mod loaders;
pub mod order;
pub mod order_type;

pub use audit::{AuditLogEntry, OrderBatchResult, Stage, PLACEHOLDER_ORDER_REF};
pub use batch::{BatchFile, BatchOrder};
pub use loaders::{load_all_toml_files, load_toml_to_batch};
pub use order::{Credentials, InsSOrder, OrderInfo, OrderRecord, StsOrder, TargetAndSelector};
pub use order_type::OrderType;
