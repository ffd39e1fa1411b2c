//! INS-S 表单填写器 - 业务能力层
//!
//! 鞋垫订单的字段集更窄：没有宽度、鞋底、鞋头，也没有鞋垫弹窗分支
//! （订单本身就是鞋垫）。附件步骤直接跳过推进。

use tracing::info;

use crate::error::EngineResult;
use crate::infrastructure::UiDriver;
use crate::models::InsSOrder;
use crate::portal::selectors::destination as dest;
use crate::services::form_filler::{
    advance, confirm_and_submit, fill_address, open_wizard, select_model, type_and_verify,
    WizardState,
};

/// INS-S 表单填写器
pub struct InsSFormFiller {
    dev_mode: bool,
    finalize: bool,
}

impl InsSFormFiller {
    pub fn new(dev_mode: bool, finalize: bool) -> Self {
        Self { dev_mode, finalize }
    }

    /// 把 INS-S 订单录入目的门户
    pub async fn fill(&self, driver: &dyn UiDriver, order: &mut InsSOrder) -> EngineResult<()> {
        info!("[订单 {}] 📝 开始录入 INS-S 向导", order.info.order_nr);

        open_wizard(driver, &order.info.order_nr).await?;
        let mut state = WizardState::AddressEntry;

        // ========== 地址 ==========
        fill_address(driver, &order.info).await?;
        state = advance(driver, state).await?;

        // ========== 使用环境 ==========
        driver
            .select_dropdown_by_text(dest::USAGE_ENV_DROPDOWN, dest::USAGE_ENV_DEFAULT)
            .await?;
        state = advance(driver, state).await?;

        // ========== 模型与尺码 ==========
        select_model(driver, &order.model).await?;
        type_and_verify(driver, dest::SIZE_LEFT_FIELD, &order.size_left).await?;
        type_and_verify(driver, dest::SIZE_RIGHT_FIELD, &order.size_right).await?;
        state = advance(driver, state).await?;

        // ========== 附件：INS-S 没有可选项，直接推进 ==========
        advance(driver, state).await?;

        // ========== 确认 ==========
        confirm_and_submit(driver, &mut order.info, self.dev_mode, self.finalize).await?;

        info!("[订单 {}] ✅ INS-S 向导录入完成", order.info.order_nr);
        Ok(())
    }
}
