//! 审计日志模型
//!
//! 每个订单的每个阶段尝试产生一条 `AuditLogEntry`，创建后不可变。
//! 条目由外部审计持久化服务长期保存，这里只定义载荷。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::order::OrderRecord;

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "GET_ORDER_INFO")]
    GetOrderInfo,
    #[serde(rename = "REGISTER_ORDER")]
    RegisterOrder,
    #[serde(rename = "ALLOCATE_ORDER")]
    AllocateOrder,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::GetOrderInfo => "GET_ORDER_INFO",
            Stage::RegisterOrder => "REGISTER_ORDER",
            Stage::AllocateOrder => "ALLOCATE_ORDER",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 一条审计日志
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// 阶段是否成功
    pub status: bool,
    /// 所属阶段
    pub stage: Stage,
    /// 创建时间
    pub timestamp: DateTime<Local>,
    /// 关联的订单号；导航失败时是占位引用
    pub order_ref: String,
    /// 失败时的具体错误文本
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditLogEntry {
    /// 成功条目
    pub fn success(stage: Stage, order_ref: impl Into<String>) -> Self {
        Self {
            status: true,
            stage,
            timestamp: Local::now(),
            order_ref: order_ref.into(),
            error: None,
        }
    }

    /// 失败条目，携带具体错误文本
    pub fn failure(stage: Stage, order_ref: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: false,
            stage,
            timestamp: Local::now(),
            order_ref: order_ref.into(),
            error: Some(error.into()),
        }
    }
}

/// 导航失败时使用的占位订单引用（尚未接触到任何具体订单）
pub const PLACEHOLDER_ORDER_REF: &str = "-";

/// 贯穿流水线的工作单元
///
/// 最多持有一个已填充的订单变体，外加该订单旅程中累积的审计日志。
/// 批次开始时创建，每个阶段就地修改，返回给调用方后即丢弃。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBatchResult {
    /// 已提取的订单（GET_ORDER_INFO 成功后填充）
    pub order: Option<OrderRecord>,
    /// 累积的审计日志
    pub logs: Vec<AuditLogEntry>,
}

impl OrderBatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条日志
    pub fn push_log(&mut self, entry: AuditLogEntry) {
        self.logs.push(entry);
    }

    /// 最近一个阶段是否成功
    pub fn last_stage_ok(&self) -> bool {
        self.logs.last().map(|e| e.status).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_match_wire_format() {
        assert_eq!(Stage::GetOrderInfo.name(), "GET_ORDER_INFO");
        assert_eq!(Stage::RegisterOrder.name(), "REGISTER_ORDER");
        assert_eq!(Stage::AllocateOrder.name(), "ALLOCATE_ORDER");
    }

    #[test]
    fn test_entry_serializes_stage_as_wire_name() {
        let entry = AuditLogEntry::failure(Stage::GetOrderInfo, "12345", "could not find order 12345");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["stage"], "GET_ORDER_INFO");
        assert_eq!(json["status"], false);
        assert_eq!(json["order_ref"], "12345");
        assert_eq!(json["error"], "could not find order 12345");
    }

    #[test]
    fn test_success_entry_has_no_error() {
        let entry = AuditLogEntry::success(Stage::RegisterOrder, "12345");
        assert!(entry.status);
        assert!(entry.error.is_none());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_last_stage_ok() {
        let mut batch = OrderBatchResult::new();
        assert!(!batch.last_stage_ok());
        batch.push_log(AuditLogEntry::success(Stage::GetOrderInfo, "1"));
        assert!(batch.last_stage_ok());
        batch.push_log(AuditLogEntry::failure(Stage::RegisterOrder, "1", "x"));
        assert!(!batch.last_stage_ok());
    }
}
