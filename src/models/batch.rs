//! 批次文件模型

use serde::{Deserialize, Serialize};

/// 批次中的一个订单号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOrder {
    /// 订单号
    pub order_nr: String,
    /// 分配阶段的缓冲天数；缺省时按鞋垫工作日规则计算
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_buffer_days: Option<i64>,
}

/// 一个 TOML 批次文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFile {
    /// 批次名称（仅用于日志）
    pub name: String,
    /// 待处理的订单号列表
    pub orders: Vec<BatchOrder>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}
