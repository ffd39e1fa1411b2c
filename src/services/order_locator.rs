//! 订单定位器 - 业务能力层
//!
//! 在来源门户的结果表（DataTables）里找到订单所在的行，
//! 返回行的点击目标、选择器和原始类型标签。
//!
//! 副作用：调用结束后搜索框保持填充状态。

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::infrastructure::UiDriver;
use crate::portal::selectors::source;
use crate::utils::logging::truncate_text;

/// 等待 processing 指示器消失的最大检查次数
const SETTLE_CHECKS: u32 = 25;

/// 单次 processing 检查的超时（毫秒）
const SETTLE_CHECK_TIMEOUT_MS: u64 = 200;

/// 订单定位器
pub struct OrderLocator;

impl OrderLocator {
    pub fn new() -> Self {
        Self
    }

    /// 定位订单行
    ///
    /// 清空并重填搜索框，等表格处理完成后读取结果。
    /// 表格只剩一条"无记录"信息行（两个已知本地化变体）时，
    /// 报 `OrderNotFound`；多行命中时第一个结构匹配获胜（既定策略）。
    pub async fn locate(
        &self,
        driver: &dyn UiDriver,
        order_nr: &str,
    ) -> EngineResult<crate::models::TargetAndSelector> {
        debug!("搜索订单: {}", order_nr);

        // 清空并重填搜索框
        driver.type_text(source::SEARCH_FIELD, order_nr).await?;

        // 等 DataTables 的 processing 指示器消失
        self.wait_until_settled(driver).await?;

        // 空结果哨兵检查
        if driver
            .element_present(source::EMPTY_ROW, false, SETTLE_CHECK_TIMEOUT_MS)
            .await?
        {
            let text = driver.read_text(source::EMPTY_ROW).await?;
            debug!("空结果行文本: {}", truncate_text(&text, 80));
            if source::NO_RECORDS_SENTINELS
                .iter()
                .any(|sentinel| text.contains(sentinel))
            {
                return Err(EngineError::OrderNotFound {
                    order_nr: order_nr.to_string(),
                });
            }
        }

        driver
            .locate_table_row(order_nr)
            .await?
            .ok_or_else(|| EngineError::OrderNotFound {
                order_nr: order_nr.to_string(),
            })
    }

    /// 等待表格处理完成
    async fn wait_until_settled(&self, driver: &dyn UiDriver) -> EngineResult<()> {
        for _ in 0..SETTLE_CHECKS {
            let busy = driver
                .element_present(source::PROCESSING_INDICATOR, true, SETTLE_CHECK_TIMEOUT_MS)
                .await?;
            if !busy {
                return Ok(());
            }
        }
        // 指示器迟迟不消失也按普通控制流处理，让后续读取自行失败
        Ok(())
    }
}

impl Default for OrderLocator {
    fn default() -> Self {
        Self::new()
    }
}
