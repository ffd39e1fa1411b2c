//! 重试控制器 - 业务能力层
//!
//! 引擎对抗页面时序不确定性（需要双击、渲染慢）的唯一手段。
//! 故意保持简单：不做指数退避、不加抖动 —— 目标页面是同步的
//! 服务端渲染向导，不是长任务。

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::infrastructure::UiDriver;

/// 重试上限
pub const MAX_ATTEMPTS: u32 = 5;

/// 单次可见性检查的超时（毫秒）
const CHECK_TIMEOUT_MS: u64 = 2_000;

/// 反复"检查-点击"直到 `check_selector` 可见
///
/// 每轮：检查 `check_selector` 的可见性；可见则正常返回，
/// 否则点击 `click_selector` 再来一轮。用尽 [`MAX_ATTEMPTS`]
/// 次后报致命错误，错误里携带 `check_selector` 便于排障。
pub async fn try_again(
    driver: &dyn UiDriver,
    check_selector: &str,
    click_selector: &str,
) -> EngineResult<()> {
    for attempt in 0..MAX_ATTEMPTS {
        if driver
            .element_present(check_selector, true, CHECK_TIMEOUT_MS)
            .await?
        {
            return Ok(());
        }

        debug!(
            "重试 {}/{}: '{}' 未出现，点击 '{}'",
            attempt + 1,
            MAX_ATTEMPTS,
            check_selector,
            click_selector
        );
        driver.click(click_selector).await?;
    }

    Err(EngineError::RetryExhausted {
        check_selector: check_selector.to_string(),
        attempts: MAX_ATTEMPTS,
    })
}
