//! 审计持久化客户端 - 业务能力层
//!
//! 审计服务本身是外部系统，这里只有它的客户端。重复消息的去重
//! 由远端负责，客户端只管原样提交。持久化失败走 `anyhow`，
//! 与业务错误（`EngineError`）分开：审计写不进去不该中断流水线。

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;

use crate::models::AuditLogEntry;

/// 审计存储
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// 追加一条审计日志
    async fn append(&self, entry: &AuditLogEntry) -> Result<()>;

    /// 按订单号分页查询历史日志
    async fn list_by_order(
        &self,
        order_nr: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<AuditLogEntry>>;
}

/// HTTP 审计存储客户端
pub struct HttpAuditStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuditStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AuditStore for HttpAuditStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        let url = format!("{}/logs", self.base_url);
        debug!("提交审计日志: {} {}", entry.stage, entry.order_ref);
        self.client
            .post(&url)
            .json(entry)
            .send()
            .await
            .context("审计服务请求失败")?
            .error_for_status()
            .context("审计服务拒绝了日志条目")?;
        Ok(())
    }

    async fn list_by_order(
        &self,
        order_nr: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<AuditLogEntry>> {
        let url = format!("{}/logs/{}", self.base_url, order_nr);
        let entries = self
            .client
            .get(&url)
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await
            .context("审计服务请求失败")?
            .error_for_status()
            .context("审计服务查询失败")?
            .json::<Vec<AuditLogEntry>>()
            .await
            .context("审计日志响应解析失败")?;
        Ok(entries)
    }
}

/// 内存审计存储（测试与离线运行）
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: Mutex<Vec<AuditLogEntry>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全部已保存的条目（按追加顺序）
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_by_order(
        &self,
        order_nr: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<AuditLogEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|e| e.order_ref == order_nr)
            .skip((page as usize) * (page_size as usize))
            .take(page_size as usize)
            .cloned()
            .collect())
    }
}
