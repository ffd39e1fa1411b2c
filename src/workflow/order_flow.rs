//! 订单处理流程 - 流程层
//!
//! 核心职责：定义"一个订单"的三个阶段入口
//!
//! 阶段顺序：
//! 1. GET_ORDER_INFO → 定位 + 提取
//! 2. REGISTER_ORDER → 目的门户向导录入
//! 3. ALLOCATE_ORDER → 来源门户排期
//!
//! 阶段边界是错误的分水岭：业务类错误（定位 / 提取 / 填单 / 日期）
//! 在阶段内转成 status=false 的审计日志条目，绝不以错误形式越界；
//! 只有驱动崩溃和导航类失败向上传播，由编排层整批终止。

use tracing::{info, warn};

use crate::error::EngineResult;
use crate::infrastructure::UiDriver;
use crate::models::{OrderBatchResult, OrderRecord, OrderType, Stage};
use crate::services::{
    AuditEmitter, AuditStore, InsSExtractor, InsSFormFiller, OrderAllocator, OrderLocator,
    StsExtractor, StsFormFiller,
};
use crate::workflow::order_ctx::OrderCtx;

/// 订单处理流程
///
/// - 编排单个订单的三个阶段
/// - 不持有任何资源（page、浏览器）
/// - 只依赖业务能力（services）
pub struct OrderFlow {
    dev_mode: bool,
    finalize: bool,
}

impl OrderFlow {
    pub fn new(dev_mode: bool, finalize: bool) -> Self {
        Self { dev_mode, finalize }
    }

    /// 阶段 1：定位并提取订单
    ///
    /// 不支持的类型（OSA / SOS）在任何提取器被调用之前就失败。
    /// 成功时返回的 `OrderBatchResult` 携带已填充的订单。
    pub async fn get_order_info(
        &self,
        driver: &dyn UiDriver,
        store: &dyn AuditStore,
        ctx: &OrderCtx,
    ) -> EngineResult<OrderBatchResult> {
        let mut batch = OrderBatchResult::new();
        let emitter = AuditEmitter::new(store);
        info!("{} 🔍 开始提取", ctx);

        match self.extract_order(driver, ctx).await {
            Ok(record) => {
                info!("{} ✓ 提取完成: {}", ctx, record.model());
                batch.order = Some(record);
                emitter
                    .success(&mut batch, Stage::GetOrderInfo, &ctx.order_nr)
                    .await;
            }
            Err(e) if e.is_driver_crash() || e.is_navigation() => return Err(e),
            Err(e) => {
                warn!("{} ⚠️ 提取失败: {}", ctx, e);
                emitter
                    .failure(&mut batch, Stage::GetOrderInfo, &ctx.order_nr, &e.to_string())
                    .await;
            }
        }
        Ok(batch)
    }

    /// 阶段 2：在目的门户录入订单
    ///
    /// 调用方负责保证 `batch.order` 已填充（阶段 1 成功后），
    /// 成功时订单的 `time_of_delivery` 被确认页回显的日期填充。
    pub async fn register_order(
        &self,
        driver: &dyn UiDriver,
        store: &dyn AuditStore,
        ctx: &OrderCtx,
        batch: &mut OrderBatchResult,
    ) -> EngineResult<()> {
        let emitter = AuditEmitter::new(store);
        info!("{} 📝 开始录入", ctx);

        let result = match batch.order.as_mut() {
            Some(OrderRecord::Sts(order)) => {
                StsFormFiller::new(self.dev_mode, self.finalize)
                    .fill(driver, order)
                    .await
            }
            Some(OrderRecord::InsS(order)) => {
                InsSFormFiller::new(self.dev_mode, self.finalize)
                    .fill(driver, order)
                    .await
            }
            None => {
                // 阶段 1 没有产出订单，调用方的前置检查漏了
                warn!("{} ⚠️ 没有可录入的订单，跳过", ctx);
                return Ok(());
            }
        };

        self.seal_stage(&emitter, batch, Stage::RegisterOrder, ctx, result)
            .await
    }

    /// 阶段 3：在来源门户排期
    pub async fn allocate_order(
        &self,
        driver: &dyn UiDriver,
        store: &dyn AuditStore,
        ctx: &OrderCtx,
        batch: &mut OrderBatchResult,
    ) -> EngineResult<()> {
        let emitter = AuditEmitter::new(store);
        info!("{} 📅 开始分配", ctx);

        let result = match batch.order.as_ref() {
            Some(order) => OrderAllocator::new(self.dev_mode, self.finalize)
                .allocate(driver, order, ctx.date_buffer_days)
                .await
                .map(|_| ()),
            None => {
                warn!("{} ⚠️ 没有可分配的订单，跳过", ctx);
                return Ok(());
            }
        };

        self.seal_stage(&emitter, batch, Stage::AllocateOrder, ctx, result)
            .await
    }

    /// 定位 + 类型路由 + 提取
    async fn extract_order(
        &self,
        driver: &dyn UiDriver,
        ctx: &OrderCtx,
    ) -> EngineResult<OrderRecord> {
        let row = OrderLocator::new().locate(driver, &ctx.order_nr).await?;

        // 类型路由先于任何提取器
        let order_type = OrderType::find(&row.type_label).filter(|t| t.is_supported());
        let order_type = match order_type {
            Some(t) => t,
            None => {
                return Err(crate::error::EngineError::UnsupportedOrderType {
                    label: row.type_label.clone(),
                })
            }
        };

        driver.click(&row.selector).await?;

        match order_type {
            OrderType::Sts => StsExtractor::new().extract(driver, &ctx.order_nr).await,
            OrderType::InsS => InsSExtractor::new().extract(driver, &ctx.order_nr).await,
            // is_supported 过滤后不可达
            OrderType::Osa | OrderType::Sos => {
                Err(crate::error::EngineError::UnsupportedOrderType {
                    label: row.type_label.clone(),
                })
            }
        }
    }

    /// 把阶段结果封口成审计日志
    ///
    /// 驱动崩溃与导航失败向上传播，其余错误就地转成失败条目。
    async fn seal_stage(
        &self,
        emitter: &AuditEmitter<'_>,
        batch: &mut OrderBatchResult,
        stage: Stage,
        ctx: &OrderCtx,
        result: EngineResult<()>,
    ) -> EngineResult<()> {
        match result {
            Ok(()) => {
                info!("{} ✓ {} 完成", ctx, stage);
                emitter.success(batch, stage, &ctx.order_nr).await;
                Ok(())
            }
            Err(e) if e.is_driver_crash() || e.is_navigation() => Err(e),
            Err(e) => {
                warn!("{} ⚠️ {} 失败: {}", ctx, stage, e);
                emitter
                    .failure(batch, stage, &ctx.order_nr, &e.to_string())
                    .await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ScriptedDriver;
    use crate::portal::selectors::source;
    use crate::services::MemoryAuditStore;

    fn ctx(order_nr: &str) -> OrderCtx {
        OrderCtx::new(order_nr.to_string(), 1, None)
    }

    /// 布置一个 STS 订单 12345 的完整详情页
    fn sts_detail_page() -> ScriptedDriver {
        ScriptedDriver::new()
            .with_row("12345", "#ordretabell tbody tr:nth-child(1)", "STS")
            .with_present(source::DETAIL_HEADING)
            .with_text(source::ORDER_NR_CELL, "12345")
            .with_text(source::CUSTOMER_CELL, "Kari Nordmann")
            .with_text(source::ADDRESS_CELLS[0], "Main St 5")
            .with_text(source::ADDRESS_CELLS[1], "1000 Oslo")
            .with_text(source::ADDRESS_CELLS[2], "Oslo, Norway")
            .with_text(source::STS_MODEL_CELL, "Classic 2")
            .with_text(source::STS_SOLE_CELL, "Vibram")
            .with_text(source::STS_TOE_CAP_CELL, "Steel")
            .with_text(source::STS_SIZE_LEFT_CELL, "42")
            .with_text(source::STS_WIDTH_RIGHT_CELL, "10")
            .with_text(source::STS_INSOLE_CELL, "Ja")
    }

    #[tokio::test]
    async fn test_get_order_info_success_fills_order_and_logs() {
        let driver = sts_detail_page();
        let store = MemoryAuditStore::new();
        let flow = OrderFlow::new(false, false);

        let batch = flow
            .get_order_info(&driver, &store, &ctx("12345"))
            .await
            .unwrap();

        assert!(batch.last_stage_ok());
        let order = batch.order.unwrap();
        assert_eq!(order.order_nr(), "12345");
        // 挪威地址 → 非 EU；单侧缺失 → 镜像
        assert!(!order.info().is_eu);
        match order {
            OrderRecord::Sts(sts) => {
                assert_eq!(sts.size_right, "42");
                assert_eq!(sts.width_left, "10");
                assert!(sts.has_insole);
            }
            _ => panic!("expected STS"),
        }
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].stage, Stage::GetOrderInfo);
    }

    #[tokio::test]
    async fn test_unsupported_type_fails_before_any_extractor() {
        let driver = ScriptedDriver::new().with_row(
            "555",
            "#ordretabell tbody tr:nth-child(1)",
            "OSA",
        );
        let store = MemoryAuditStore::new();
        let flow = OrderFlow::new(false, false);

        let batch = flow
            .get_order_info(&driver, &store, &ctx("555"))
            .await
            .unwrap();

        assert!(batch.order.is_none());
        assert!(!batch.last_stage_ok());
        assert_eq!(
            batch.logs[0].error.as_deref(),
            Some("unsupported order type: OSA")
        );
        // 类型路由在点击详情页之前：除搜索外没有任何点击发生
        assert!(driver.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_missing_order_becomes_failure_log_not_error() {
        let driver = ScriptedDriver::new()
            .with_text(source::EMPTY_ROW, "No matching records found");
        let store = MemoryAuditStore::new();
        let flow = OrderFlow::new(false, false);

        let batch = flow
            .get_order_info(&driver, &store, &ctx("99999"))
            .await
            .unwrap();

        assert!(!batch.last_stage_ok());
        assert_eq!(
            batch.logs[0].error.as_deref(),
            Some("could not find order 99999")
        );
    }

    #[tokio::test]
    async fn test_register_without_order_is_noop() {
        let driver = ScriptedDriver::new();
        let store = MemoryAuditStore::new();
        let flow = OrderFlow::new(false, false);
        let mut batch = OrderBatchResult::new();

        flow.register_order(&driver, &store, &ctx("1"), &mut batch)
            .await
            .unwrap();

        assert!(batch.logs.is_empty());
        assert!(store.entries().is_empty());
    }
}
