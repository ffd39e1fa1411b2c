//! 单订单处理器 - 编排层
//!
//! 串起一个订单的三个阶段，并在每个阶段之间：
//! 1. 检查取消令牌（批次可被外部中途叫停）
//! 2. 重新登录对应门户（阶段之间门户会话是关闭重开的，
//!    所以订单数据由 `OrderBatchResult` 在内存中携带）
//!
//! 登录 / 导航失败在这里转成占位订单引用的审计日志后向上传播，
//! 由批处理器整批终止。

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::infrastructure::UiDriver;
use crate::models::{AuditLogEntry, BatchOrder, OrderBatchResult, Stage, PLACEHOLDER_ORDER_REF};
use crate::services::{session, AuditStore};
use crate::workflow::{OrderCtx, OrderFlow};

/// 处理单个订单的完整三阶段旅程
///
/// 返回的 `OrderBatchResult` 携带全部审计日志；某个阶段失败时
/// 后续阶段不再执行，日志条目少于三条。
pub async fn process_order(
    driver: &dyn UiDriver,
    store: &dyn AuditStore,
    config: &Config,
    order: &BatchOrder,
    batch_index: usize,
    cancel: &CancellationToken,
) -> EngineResult<OrderBatchResult> {
    let ctx = OrderCtx::new(order.order_nr.clone(), batch_index, order.date_buffer_days);
    let flow = OrderFlow::new(config.dev_mode, config.finalize);

    // ========== 阶段 1: 来源门户提取 ==========
    guard_cancel(cancel)?;
    login_source(driver, store, config, Stage::GetOrderInfo).await?;

    let mut batch = flow.get_order_info(driver, store, &ctx).await?;
    if !batch.last_stage_ok() {
        return Ok(batch);
    }

    // ========== 阶段 2: 目的门户录入 ==========
    guard_cancel(cancel)?;
    if let Err(e) = session::login_destination(
        driver,
        &config.destination_portal_url,
        &config.destination_credentials(),
    )
    .await
    {
        return Err(note_navigation(store, Stage::RegisterOrder, e).await);
    }

    flow.register_order(driver, store, &ctx, &mut batch).await?;
    if !batch.last_stage_ok() {
        return Ok(batch);
    }

    // ========== 阶段 3: 回到来源门户分配 ==========
    guard_cancel(cancel)?;
    login_source(driver, store, config, Stage::AllocateOrder).await?;

    flow.allocate_order(driver, store, &ctx, &mut batch).await?;

    info!("{} 处理结束 (成功: {})", ctx, batch.last_stage_ok());
    Ok(batch)
}

/// 登录来源门户，导航失败转成占位审计日志后传播
async fn login_source(
    driver: &dyn UiDriver,
    store: &dyn AuditStore,
    config: &Config,
    stage: Stage,
) -> EngineResult<()> {
    if let Err(e) = session::login_source(
        driver,
        &config.source_portal_url,
        &config.source_credentials(),
    )
    .await
    {
        return Err(note_navigation(store, stage, e).await);
    }
    Ok(())
}

/// 导航失败：对占位订单引用记一条失败日志，然后把错误原样交回
async fn note_navigation(store: &dyn AuditStore, stage: Stage, e: EngineError) -> EngineError {
    if e.is_navigation() {
        error!("❌ 导航失败，整批终止: {}", e);
        let entry = AuditLogEntry::failure(stage, PLACEHOLDER_ORDER_REF, e.to_string());
        if let Err(append_err) = store.append(&entry).await {
            error!("⚠️ 占位审计日志写入失败: {:#}", append_err);
        }
    }
    e
}

/// 阶段之间检查取消令牌
fn guard_cancel(cancel: &CancellationToken) -> EngineResult<()> {
    if cancel.is_cancelled() {
        Err(EngineError::Cancelled)
    } else {
        Ok(())
    }
}
