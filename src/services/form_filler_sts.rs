//! STS 表单填写器 - 业务能力层
//!
//! 驱动目的门户的向导把一个 STS 订单（定制鞋，全字段）录入进去。
//! 与 INS-S 填写器只在"填哪些字段、走不走鞋垫弹窗分支"上不同，
//! 线性状态机的形状完全一致。

use tracing::info;

use crate::error::EngineResult;
use crate::infrastructure::UiDriver;
use crate::models::StsOrder;
use crate::portal::selectors::destination as dest;
use crate::services::form_filler::{
    advance, confirm_and_submit, fill_address, open_wizard, select_model, type_and_verify,
    WizardState,
};
use crate::services::retry;

/// STS 表单填写器
pub struct StsFormFiller {
    dev_mode: bool,
    finalize: bool,
}

impl StsFormFiller {
    pub fn new(dev_mode: bool, finalize: bool) -> Self {
        Self { dev_mode, finalize }
    }

    /// 把 STS 订单录入目的门户
    ///
    /// 成功后 `order.info.time_of_delivery` 被确认页回显的日期
    /// （开发模式下为合成日期）填充。
    pub async fn fill(&self, driver: &dyn UiDriver, order: &mut StsOrder) -> EngineResult<()> {
        info!("[订单 {}] 📝 开始录入 STS 向导", order.info.order_nr);

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
        type_and_verify(driver, dest::WIDTH_LEFT_FIELD, &order.width_left).await?;
        type_and_verify(driver, dest::WIDTH_RIGHT_FIELD, &order.width_right).await?;
        driver
            .select_dropdown_by_text(dest::SOLE_DROPDOWN, &order.sole)
            .await?;
        driver
            .select_dropdown_by_text(dest::TOE_CAP_DROPDOWN, &order.toe_cap)
            .await?;
        state = advance(driver, state).await?;

        // ========== 附件 / 鞋垫分支 ==========
        if order.has_insole {
            self.enter_insole_branch(driver).await?;
        }
        advance(driver, state).await?;

        // ========== 确认 ==========
        confirm_and_submit(driver, &mut order.info, self.dev_mode, self.finalize).await?;

        info!("[订单 {}] ✅ STS 向导录入完成", order.info.order_nr);
        Ok(())
    }

    /// 鞋垫弹窗分支（只有 STS 有）
    async fn enter_insole_branch(&self, driver: &dyn UiDriver) -> EngineResult<()> {
        driver.click(dest::INSOLE_OPTION).await?;
        if !driver
            .element_present(dest::INSOLE_MODAL_MARKER, true, crate::infrastructure::DEFAULT_TIMEOUT_MS)
            .await?
        {
            retry::try_again(driver, dest::INSOLE_MODAL_MARKER, dest::INSOLE_OPTION).await?;
        }
        driver.click(dest::INSOLE_MODAL_CONFIRM).await?;
        Ok(())
    }
}
