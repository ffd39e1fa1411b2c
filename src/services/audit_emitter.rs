//! 审计发射器 - 业务能力层
//!
//! 每个阶段尝试（无论成败）产生一条审计日志：同时写入进行中的
//! `OrderBatchResult` 和外部 `AuditStore`。存储写入失败只记警告
//! 不中断流水线，内存里的那份仍然完整。

use tracing::warn;

use crate::models::{AuditLogEntry, OrderBatchResult, Stage};
use crate::services::audit_client::AuditStore;

/// 审计发射器
pub struct AuditEmitter<'a> {
    store: &'a dyn AuditStore,
}

impl<'a> AuditEmitter<'a> {
    pub fn new(store: &'a dyn AuditStore) -> Self {
        Self { store }
    }

    /// 记录一次成功的阶段
    pub async fn success(&self, batch: &mut OrderBatchResult, stage: Stage, order_ref: &str) {
        self.emit(batch, AuditLogEntry::success(stage, order_ref)).await;
    }

    /// 记录一次失败的阶段，错误文本原样入库
    pub async fn failure(
        &self,
        batch: &mut OrderBatchResult,
        stage: Stage,
        order_ref: &str,
        error: &str,
    ) {
        self.emit(batch, AuditLogEntry::failure(stage, order_ref, error))
            .await;
    }

    async fn emit(&self, batch: &mut OrderBatchResult, entry: AuditLogEntry) {
        if let Err(e) = self.store.append(&entry).await {
            warn!("⚠️ 审计日志写入失败（继续执行）: {:#}", e);
        }
        batch.push_log(entry);
    }
}
