//! 订单数据模型
//!
//! `OrderInfo` 是两种订单共享的核心字段；`StsOrder` / `InsSOrder`
//! 在其之上各自增加类型专属字段。订单记录只存活于一次流水线运行中，
//! 不落盘 —— 持久化的只有审计日志。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 来源门户结果表中的一行定位信息
///
/// 由订单定位器产生，仅在当次调用内有效，不做持久化。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetAndSelector {
    /// 行的点击目标
    pub target: String,
    /// 行的 CSS 选择器
    pub selector: String,
    /// 表格里展示的原始类型标签（"STS" / "INS-S" / "OSA" / "SOS"）
    pub type_label: String,
}

/// 两种订单共享的核心字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInfo {
    /// 订单号（两个门户上的唯一标识）
    pub order_nr: String,
    /// 客户姓名
    pub customer_name: String,
    /// 配送地址：街道行、邮编+城市、国家行（至少 3 行）
    pub delivery_address: Vec<String>,
    /// 交付日期（分配阶段之前可为空）
    pub time_of_delivery: Option<NaiveDate>,
    /// 是否走 EU 配送路径（地址含 "Norway" 时强制为 false）
    pub is_eu: bool,
}

impl OrderInfo {
    pub fn new(order_nr: impl Into<String>) -> Self {
        Self {
            order_nr: order_nr.into(),
            customer_name: String::new(),
            delivery_address: Vec::new(),
            time_of_delivery: None,
            is_eu: true,
        }
    }
}

/// STS 订单（定制鞋，全字段）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StsOrder {
    pub info: OrderInfo,
    pub model: String,
    pub sole: String,
    pub toe_cap: String,
    pub size_left: String,
    pub size_right: String,
    pub width_left: String,
    pub width_right: String,
    pub has_insole: bool,
}

/// INS-S 订单（鞋垫，来源页上结构化数据更少）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsSOrder {
    pub info: OrderInfo,
    pub model: String,
    pub size_left: String,
    pub size_right: String,
}

/// 已提取的订单记录（两种具体变体之一）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderRecord {
    Sts(StsOrder),
    InsS(InsSOrder),
}

impl OrderRecord {
    /// 共享核心字段
    pub fn info(&self) -> &OrderInfo {
        match self {
            OrderRecord::Sts(o) => &o.info,
            OrderRecord::InsS(o) => &o.info,
        }
    }

    pub fn info_mut(&mut self) -> &mut OrderInfo {
        match self {
            OrderRecord::Sts(o) => &mut o.info,
            OrderRecord::InsS(o) => &mut o.info,
        }
    }

    pub fn order_nr(&self) -> &str {
        &self.info().order_nr
    }

    pub fn model(&self) -> &str {
        match self {
            OrderRecord::Sts(o) => &o.model,
            OrderRecord::InsS(o) => &o.model,
        }
    }

    /// 是否带鞋垫（只有 STS 订单可能带）
    pub fn has_insole(&self) -> bool {
        match self {
            OrderRecord::Sts(o) => o.has_insole,
            OrderRecord::InsS(_) => false,
        }
    }
}

/// 门户登录凭据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
