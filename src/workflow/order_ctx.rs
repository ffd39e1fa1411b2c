//! 订单处理上下文
//!
//! 封装"我正在处理批次里的哪个订单"这一信息

use std::fmt::Display;

/// 订单处理上下文
///
/// 包含处理单个订单所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct OrderCtx {
    /// 订单号（来源门户的主键）
    pub order_nr: String,

    /// 订单在批次中的索引（仅用于日志显示，从 1 开始）
    pub batch_index: usize,

    /// 分配阶段的交付日期缓冲天数（批次文件可按订单指定）
    pub date_buffer_days: Option<i64>,
}

impl OrderCtx {
    /// 创建新的订单上下文
    pub fn new(order_nr: String, batch_index: usize, date_buffer_days: Option<i64>) -> Self {
        Self {
            order_nr,
            batch_index,
            date_buffer_days,
        }
    }
}

impl Display for OrderCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[订单 #{} 批次序号#{}]", self.order_nr, self.batch_index)
    }
}
