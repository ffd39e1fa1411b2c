//! 批量订单处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量订单的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、启动/连接浏览器、创建 PortalDriver 与审计存储
//! 2. **批量加载**：扫描并加载所有待处理的批次文件（`Vec<BatchFile>`）
//! 3. **严格串行**：一个浏览器会话只处理一个订单，向导状态是就地修改的
//! 4. **终止策略**：导航失败整批终止；提取/填单失败跳到下一个订单；
//!    驱动崩溃直接向上传播
//! 5. **资源管理**：持有 Browser 和 PortalDriver，确保生命周期正确
//! 6. **全局统计**：汇总所有订单的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个订单的细节
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **向下委托**：委托 order_processor 处理单个订单

use anyhow::Result;
use chromiumoxide::Browser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::EngineError;
use crate::infrastructure::PortalDriver;
use crate::models::{load_all_toml_files, BatchFile};
use crate::orchestrator::order_processor;
use crate::services::{AuditStore, HttpAuditStore, MemoryAuditStore};
use crate::utils::logging::init_log_file;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    driver: PortalDriver,
    store: Arc<dyn AuditStore>,
    cancel: CancellationToken,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        // 初始化运行日志文件
        init_log_file(&config.output_log_file)?;

        // 启动或连接浏览器
        let (browser, page) = if config.browser_debug_port > 0 {
            browser::connect_to_browser_and_page(
                config.browser_debug_port,
                Some(&config.source_portal_url),
            )
            .await?
        } else {
            browser::launch_headless_browser(&config.source_portal_url).await?
        };

        // 创建 PortalDriver（持有 page）
        let driver = PortalDriver::new(page);

        // 审计存储：配置了服务地址走 HTTP，否则只写内存
        let store: Arc<dyn AuditStore> = if config.audit_base_url.is_empty() {
            warn!("⚠️ 未配置审计服务地址，日志只保留在内存中");
            Arc::new(MemoryAuditStore::new())
        } else {
            Arc::new(HttpAuditStore::new(config.audit_base_url.clone()))
        };

        Ok(Self {
            config,
            _browser: browser,
            driver,
            store,
            cancel: CancellationToken::new(),
        })
    }

    /// 外部取消句柄（信号处理等）
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载所有待处理的批次文件
        let batches = self.load_batches().await?;

        if batches.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML批次文件，程序结束");
            return Ok(());
        }

        let mut stats = ProcessingStats::default();
        for batch_file in &batches {
            let batch_stats = self.process_batch(batch_file).await?;
            stats.success += batch_stats.success;
            stats.failed += batch_stats.failed;
            stats.total += batch_stats.total;
            if self.cancel.is_cancelled() {
                break;
            }
        }

        // 输出最终统计
        print_final_stats(&stats, &self.config.output_log_file);

        Ok(())
    }

    /// 加载批次文件
    async fn load_batches(&self) -> Result<Vec<BatchFile>> {
        info!("\n📁 正在扫描待处理的批次文件...");
        load_all_toml_files(&self.config.toml_folder).await
    }

    /// 处理单个批次（严格串行）
    async fn process_batch(&self, batch_file: &BatchFile) -> Result<ProcessingStats> {
        let total = batch_file.orders.len();
        log_batch_start(&batch_file.name, total);

        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        for (idx, order) in batch_file.orders.iter().enumerate() {
            let batch_index = idx + 1;

            match order_processor::process_order(
                &self.driver,
                self.store.as_ref(),
                &self.config,
                order,
                batch_index,
                &self.cancel,
            )
            .await
            {
                Ok(result) if result.last_stage_ok() => {
                    info!("[订单 {}] ✅ 全部阶段完成", order.order_nr);
                    stats.success += 1;
                }
                Ok(result) => {
                    // 某个阶段失败，审计日志里已有具体错误，跳到下一个订单
                    warn!(
                        "[订单 {}] ⚠️ 处理中止于第 {} 个阶段",
                        order.order_nr,
                        result.logs.len()
                    );
                    stats.failed += 1;
                }
                Err(EngineError::Cancelled) => {
                    warn!("⚠️ 批次被取消，剩余 {} 个订单未处理", total - idx);
                    stats.failed += total - idx;
                    break;
                }
                Err(e) if e.is_navigation() => {
                    // 占位审计日志已由 order_processor 写入
                    error!("❌ 导航失败，批次 '{}' 终止: {}", batch_file.name, e);
                    stats.failed += total - idx;
                    break;
                }
                Err(e) => {
                    // 驱动崩溃：浏览器会话已不可用，向上传播
                    error!("[订单 {}] ❌ 驱动崩溃: {}", order.order_nr, e);
                    return Err(e.into());
                }
            }
        }

        log_batch_complete(&batch_file.name, &stats);
        Ok(stats)
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 订单转录与分配模式");
    info!("📋 批次目录: {}", config.toml_folder);
    if config.dev_mode {
        info!("🧪 开发模式: 跳过最终保存，交付日期为合成值");
    }
    info!("{}", "=".repeat(60));
}

fn log_batch_start(name: &str, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理批次: {}", name);
    info!("📄 共 {} 个订单，严格串行", total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(name: &str, stats: &ProcessingStats) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 批次 {} 完成: 成功 {}/{}",
        name, stats.success, stats.total
    );
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &ProcessingStats, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("\n日志已保存至: {}", log_file_path);
    info!("{}", "=".repeat(60));
}
