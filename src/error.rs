//! 引擎错误类型
//!
//! 错误分为五类（导航 / 提取校验 / 表单填写 / 日期对账 / 不支持的订单类型），
//! 外加底层驱动崩溃。业务类错误由各阶段自行捕获并转成审计日志条目，
//! 只有驱动崩溃（会话断开、浏览器进程消失）才会向上传播。
//!
//! 注意：`Display` 文本会原样写入审计日志（目的门户按英文展示），
//! 因此错误信息必须指明具体字段，不能笼统。

use thiserror::Error;

/// 引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    // ========== 驱动崩溃（致命，直接向上传播） ==========
    /// 浏览器协议层错误
    #[error("browser driver failure: {0}")]
    Driver(#[from] chromiumoxide::error::CdpError),

    // ========== 导航失败（整批终止） ==========
    /// 登录被拒绝
    #[error("login rejected for user '{username}'")]
    LoginRejected { username: String },

    /// 落在了错误的页面上
    #[error("navigation failed: expected to land on '{expected}', got '{actual}'")]
    Navigation { expected: String, actual: String },

    // ========== 定位 / 提取校验失败（仅当前订单终止） ==========
    /// 订单在结果表中不存在
    #[error("could not find order {order_nr}")]
    OrderNotFound { order_nr: String },

    /// 订单详情页没有出现
    #[error("could not find order page for {order_nr}")]
    OrderPageMissing { order_nr: String },

    /// 页面回显的订单号与请求不一致（防止串页）
    #[error("order number mismatch: requested {requested}, page shows {found}")]
    OrderNrMismatch { requested: String, found: String },

    /// 必填字段缺失
    #[error("order is missing mandatory field: {field}")]
    MissingField { field: &'static str },

    /// 左右两侧同时缺失（尺码 / 宽度）
    #[error("both left and right {field} values are missing")]
    BothSidesMissing { field: &'static str },

    /// 不支持的订单类型
    #[error("unsupported order type: {label}")]
    UnsupportedOrderType { label: String },

    /// 页面元素不存在（驱动在超时内没有找到，属于普通控制流）
    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    // ========== 表单填写失败 ==========
    /// 输入校验失败：写入后重写一次仍与期望不符
    #[error("input verification failed for {selector}: wrote '{expected}', page kept '{actual}'")]
    InputMismatch {
        selector: String,
        expected: String,
        actual: String,
    },

    /// 模型列表中没有匹配项
    #[error("no model in the list matches '{model}'")]
    ModelNotFound { model: String },

    /// 重试控制器用尽次数
    #[error("failed to try again: '{check_selector}' never appeared after {attempts} attempts")]
    RetryExhausted {
        check_selector: String,
        attempts: u32,
    },

    // ========== 日期对账失败 ==========
    /// 批次文件给出的缓冲天数为负
    #[error("date buffer days must not be negative, got {days}")]
    NegativeDateBuffer { days: i64 },

    /// 日历只能前进，目标日期已经过去
    #[error("cannot set delivery date in the past (target {target}, calendar shows {displayed})")]
    DeliveryDateInPast { target: String, displayed: String },

    /// 日历推进循环超出上限
    #[error("loop overload while adjusting calendar {unit} (gave up after {attempts} attempts)")]
    LoopOverload { unit: &'static str, attempts: u32 },

    /// 无法识别的月份名称
    #[error("unrecognized month name: '{name}'")]
    BadMonthName { name: String },

    /// 无法解析确认弹窗回显的日期
    #[error("unparseable delivery date: '{raw}'")]
    BadDeliveryDate { raw: String },

    // ========== 其他 ==========
    /// 批次被外部取消
    #[error("batch cancelled")]
    Cancelled,
}

impl EngineError {
    /// 是否为驱动崩溃
    ///
    /// 只有这一类错误允许越过阶段边界向调用方传播，
    /// 其余全部转成 status=false 的审计日志条目。
    pub fn is_driver_crash(&self) -> bool {
        matches!(self, EngineError::Driver(_))
    }

    /// 是否为导航类失败（整批终止，而不是仅跳过当前订单）
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            EngineError::LoginRejected { .. } | EngineError::Navigation { .. }
        )
    }
}

/// 引擎结果类型
pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_field_specific() {
        let e = EngineError::MissingField { field: "toe cap" };
        assert_eq!(e.to_string(), "order is missing mandatory field: toe cap");

        let e = EngineError::BothSidesMissing { field: "size" };
        assert_eq!(e.to_string(), "both left and right size values are missing");

        let e = EngineError::UnsupportedOrderType {
            label: "OSA".to_string(),
        };
        assert_eq!(e.to_string(), "unsupported order type: OSA");
    }

    #[test]
    fn test_date_in_past_message() {
        let e = EngineError::DeliveryDateInPast {
            target: "2023".to_string(),
            displayed: "2025".to_string(),
        };
        assert!(e
            .to_string()
            .starts_with("cannot set delivery date in the past"));
    }

    #[test]
    fn test_only_driver_errors_are_crashes() {
        assert!(!EngineError::Cancelled.is_driver_crash());
        assert!(!EngineError::OrderNotFound {
            order_nr: "12345".to_string()
        }
        .is_driver_crash());
    }
}
