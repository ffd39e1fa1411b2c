//! 订单提取器 - 业务能力层
//!
//! 调用方已经点进订单详情页之后才会调用这里。提取按固定步骤走：
//! 断言详情页标题存在 → 按固定位置读通用单元格 → 校验页面回显的
//! 订单号 → 读类型专属字段 → 应用镜像与 EU 不变量 → 必填检查。
//!
//! 任何断言失败都会产生指明具体字段的类型化错误 —— 错误文本直接
//! 进审计日志，所以必须具体到字段，不能笼统。

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::infrastructure::{UiDriver, DEFAULT_TIMEOUT_MS};
use crate::models::{InsSOrder, OrderInfo, OrderRecord, StsOrder};
use crate::portal::selectors::source;

/// 强制非 EU 配送路径的国家令牌（目的门户的业务规则）
const NON_EU_TOKEN: &str = "Norway";

/// STS 订单提取器
pub struct StsExtractor;

/// INS-S 订单提取器（来源页上结构化数据更少，字段集更窄）
pub struct InsSExtractor;

impl StsExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 提取 STS 订单
    pub async fn extract(
        &self,
        driver: &dyn UiDriver,
        order_nr: &str,
    ) -> EngineResult<OrderRecord> {
        assert_detail_page(driver, order_nr).await?;
        let info = read_common_info(driver, order_nr).await?;

        let model = mandatory(read_optional(driver, source::STS_MODEL_CELL).await?, "model")?;
        let sole = mandatory(read_optional(driver, source::STS_SOLE_CELL).await?, "sole")?;
        let toe_cap = mandatory(
            read_optional(driver, source::STS_TOE_CAP_CELL).await?,
            "toe cap",
        )?;

        let (size_left, size_right) = mirror_sides(
            read_optional(driver, source::STS_SIZE_LEFT_CELL).await?,
            read_optional(driver, source::STS_SIZE_RIGHT_CELL).await?,
            "size",
        )?;
        let (width_left, width_right) = mirror_sides(
            read_optional(driver, source::STS_WIDTH_LEFT_CELL).await?,
            read_optional(driver, source::STS_WIDTH_RIGHT_CELL).await?,
            "width",
        )?;

        let has_insole = parse_yes_no(read_optional(driver, source::STS_INSOLE_CELL).await?);

        debug!("STS 订单 {} 提取完成 (鞋垫: {})", order_nr, has_insole);

        Ok(OrderRecord::Sts(StsOrder {
            info,
            model,
            sole,
            toe_cap,
            size_left,
            size_right,
            width_left,
            width_right,
            has_insole,
        }))
    }
}

impl InsSExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 提取 INS-S 订单
    pub async fn extract(
        &self,
        driver: &dyn UiDriver,
        order_nr: &str,
    ) -> EngineResult<OrderRecord> {
        assert_detail_page(driver, order_nr).await?;
        let info = read_common_info(driver, order_nr).await?;

        let model = mandatory(
            read_optional(driver, source::INSS_MODEL_CELL).await?,
            "model",
        )?;
        let (size_left, size_right) = mirror_sides(
            read_optional(driver, source::INSS_SIZE_LEFT_CELL).await?,
            read_optional(driver, source::INSS_SIZE_RIGHT_CELL).await?,
            "size",
        )?;

        debug!("INS-S 订单 {} 提取完成", order_nr);

        Ok(OrderRecord::InsS(InsSOrder {
            info,
            model,
            size_left,
            size_right,
        }))
    }
}

impl Default for StsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for InsSExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ========== 共享步骤 ==========

/// 断言详情页标题存在
async fn assert_detail_page(driver: &dyn UiDriver, order_nr: &str) -> EngineResult<()> {
    let present = driver
        .element_present(source::DETAIL_HEADING, false, DEFAULT_TIMEOUT_MS)
        .await?;
    if !present {
        return Err(EngineError::OrderPageMissing {
            order_nr: order_nr.to_string(),
        });
    }
    Ok(())
}

/// 按固定位置读取通用信息，并校验回显订单号
async fn read_common_info(driver: &dyn UiDriver, order_nr: &str) -> EngineResult<OrderInfo> {
    // 回显订单号必须与请求一致，防止拿到陈旧 / 串路的页面
    let echoed = driver.read_text(source::ORDER_NR_CELL).await?;
    if echoed.trim() != order_nr {
        return Err(EngineError::OrderNrMismatch {
            requested: order_nr.to_string(),
            found: echoed.trim().to_string(),
        });
    }

    let customer_name = mandatory(
        read_optional(driver, source::CUSTOMER_CELL).await?,
        "customer name",
    )?;

    let mut delivery_address = Vec::new();
    for cell in source::ADDRESS_CELLS {
        if let Some(line) = read_optional(driver, cell).await? {
            delivery_address.push(line);
        }
    }
    if delivery_address.len() < 3 {
        return Err(EngineError::MissingField {
            field: "delivery address",
        });
    }

    let mut info = OrderInfo::new(order_nr);
    info.customer_name = customer_name;
    // 地址含 "Norway" 时强制非 EU 配送路径
    info.is_eu = !delivery_address.iter().any(|line| line.contains(NON_EU_TOKEN));
    info.delivery_address = delivery_address;

    Ok(info)
}

/// 读取可选单元格；元素不存在或为空都按"缺失"处理
async fn read_optional(driver: &dyn UiDriver, selector: &str) -> EngineResult<Option<String>> {
    match driver.read_text(selector).await {
        Ok(text) => {
            let trimmed = text.trim().to_string();
            Ok(if trimmed.is_empty() { None } else { Some(trimmed) })
        }
        Err(EngineError::ElementNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// 必填检查，错误文本指明字段
fn mandatory(value: Option<String>, field: &'static str) -> EngineResult<String> {
    value.ok_or(EngineError::MissingField { field })
}

/// 左右镜像不变量
///
/// 恰好一侧缺失时从另一侧镜像；两侧都缺失按字段报错。
fn mirror_sides(
    left: Option<String>,
    right: Option<String>,
    field: &'static str,
) -> EngineResult<(String, String)> {
    match (left, right) {
        (Some(l), Some(r)) => Ok((l, r)),
        (Some(l), None) => Ok((l.clone(), l)),
        (None, Some(r)) => Ok((r.clone(), r)),
        (None, None) => Err(EngineError::BothSidesMissing { field }),
    }
}

/// 来源页的是/否单元格（挪威语与英语都出现过）
fn parse_yes_no(value: Option<String>) -> bool {
    match value {
        Some(v) => {
            let v = v.to_lowercase();
            v == "ja" || v == "yes" || v == "x" || v == "1"
        }
        None => false,
    }
}
