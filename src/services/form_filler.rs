//! 表单填写共享件 - 业务能力层
//!
//! 目的门户的向导是线性状态机，没有回退转移（重试控制器除外）。
//! 状态由"标记元素是否出现"代理 —— 这里把它显式化为 `WizardState`
//! 枚举加 `is_in_state` 能力，转移表是显式代码而不是调用顺序的副产品。

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::infrastructure::{UiDriver, DEFAULT_TIMEOUT_MS};
use crate::models::OrderInfo;
use crate::portal::selectors::destination as dest;
use crate::services::retry;

/// 向导状态
///
/// 线性推进：AddressEntry → UsageEnvironment → ModelAndSize →
/// Supplement → Confirmation → Submitted。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    AddressEntry,
    UsageEnvironment,
    ModelAndSize,
    Supplement,
    Confirmation,
    Submitted,
}

impl WizardState {
    /// 该状态的标记元素
    pub fn marker(self) -> &'static str {
        match self {
            WizardState::AddressEntry => dest::STEP_ADDRESS_MARKER,
            WizardState::UsageEnvironment => dest::STEP_USAGE_MARKER,
            WizardState::ModelAndSize => dest::STEP_MODEL_MARKER,
            WizardState::Supplement => dest::STEP_SUPPLEMENT_MARKER,
            WizardState::Confirmation => dest::STEP_CONFIRM_MARKER,
            WizardState::Submitted => dest::RECEIPT_MARKER,
        }
    }

    /// 离开该状态的"下一步"控制（Submitted 没有）
    pub fn next_button(self) -> Option<&'static str> {
        match self {
            WizardState::AddressEntry => Some(dest::STEP_ADDRESS_NEXT),
            WizardState::UsageEnvironment => Some(dest::STEP_USAGE_NEXT),
            WizardState::ModelAndSize => Some(dest::STEP_MODEL_NEXT),
            WizardState::Supplement => Some(dest::STEP_SUPPLEMENT_NEXT),
            WizardState::Confirmation | WizardState::Submitted => None,
        }
    }

    /// 线性后继
    pub fn successor(self) -> Option<WizardState> {
        match self {
            WizardState::AddressEntry => Some(WizardState::UsageEnvironment),
            WizardState::UsageEnvironment => Some(WizardState::ModelAndSize),
            WizardState::ModelAndSize => Some(WizardState::Supplement),
            WizardState::Supplement => Some(WizardState::Confirmation),
            WizardState::Confirmation => Some(WizardState::Submitted),
            WizardState::Submitted => None,
        }
    }
}

/// 是否处于指定向导状态（标记元素出现即视为到达）
pub async fn is_in_state(driver: &dyn UiDriver, state: WizardState) -> EngineResult<bool> {
    driver
        .element_present(state.marker(), true, DEFAULT_TIMEOUT_MS)
        .await
}

/// 点"下一步"并确认到达后继状态
///
/// 后继标记没出现时交给重试控制器（需要双击 / 渲染慢的场合）。
pub async fn advance(driver: &dyn UiDriver, from: WizardState) -> EngineResult<WizardState> {
    let to = from.successor().ok_or(EngineError::ElementNotFound {
        selector: from.marker().to_string(),
    })?;
    let next_button = from.next_button().ok_or(EngineError::ElementNotFound {
        selector: from.marker().to_string(),
    })?;

    debug!("向导推进: {:?} → {:?}", from, to);
    driver.click(next_button).await?;

    if !is_in_state(driver, to).await? {
        retry::try_again(driver, to.marker(), next_button).await?;
    }
    Ok(to)
}

/// 输入并校验，最多重写一次
///
/// 所有文本输入统一走这里：写入 → 回读 → 不符则重写一次 →
/// 仍不符则报 `InputMismatch`。
pub async fn type_and_verify(
    driver: &dyn UiDriver,
    selector: &str,
    value: &str,
) -> EngineResult<()> {
    driver.type_text(selector, value).await?;
    if driver.read_input_value(selector).await? == value {
        return Ok(());
    }

    // 页面偶尔吞掉第一次输入，重写一次
    driver.type_text(selector, value).await?;
    let actual = driver.read_input_value(selector).await?;
    if actual == value {
        return Ok(());
    }

    Err(EngineError::InputMismatch {
        selector: selector.to_string(),
        expected: value.to_string(),
        actual,
    })
}

/// 在模型列表中选择目录模型
///
/// 对页面展示的模型名做线性扫描，展示名（忽略大小写）作为子串
/// 含于目录模型字符串、或反向包含时视为命中；第一个命中获胜，
/// 零命中报错（两种订单类型统一为这一个策略）。
pub async fn select_model(driver: &dyn UiDriver, model: &str) -> EngineResult<()> {
    let displayed = driver.read_texts(dest::MODEL_LIST_ITEMS).await?;
    let model_lower = model.to_lowercase();

    for (index, name) in displayed.iter().enumerate() {
        let name_lower = name.to_lowercase();
        if name_lower.contains(&model_lower) || model_lower.contains(&name_lower) {
            debug!("模型命中: '{}' (第 {} 项)", name, index + 1);
            driver.click(&dest::model_item(index)).await?;
            return Ok(());
        }
    }

    Err(EngineError::ModelNotFound {
        model: model.to_string(),
    })
}

/// 地址步骤
///
/// EU 订单走 Ortowear 中转地址快捷路径；非 EU（挪威）订单
/// 逐字段填写完整地址，绝不触碰快捷路径。
pub async fn fill_address(driver: &dyn UiDriver, info: &OrderInfo) -> EngineResult<()> {
    if info.is_eu {
        debug!("EU 订单，走 Ortowear 中转地址");
        driver.click(dest::ADDRESS_ORTOWEAR_SHORTCUT).await?;
        return Ok(());
    }

    debug!("非 EU 订单，逐字段填写地址");
    type_and_verify(driver, dest::ADDRESS_NAME, &info.customer_name).await?;
    type_and_verify(driver, dest::ADDRESS_STREET, &info.delivery_address[0]).await?;
    type_and_verify(driver, dest::ADDRESS_POSTAL, &info.delivery_address[1]).await?;
    type_and_verify(driver, dest::ADDRESS_COUNTRY, &info.delivery_address[2]).await?;
    Ok(())
}

/// 确认步骤：读回交付日期并提交
///
/// 开发模式下短路最后的"保存"点击，改用合成交付日期（今天 + 7 天）——
/// 这是显式的测试 / 预发逃生口，由调用方用 flag 打开，不从环境推断。
pub async fn confirm_and_submit(
    driver: &dyn UiDriver,
    info: &mut crate::models::OrderInfo,
    dev_mode: bool,
    finalize: bool,
) -> EngineResult<()> {
    if dev_mode {
        info.time_of_delivery =
            Some(chrono::Local::now().date_naive() + chrono::Days::new(7));
        debug!("开发模式：跳过保存点击，交付日期使用今天 + 7 天");
        return Ok(());
    }

    let raw = driver.read_text(dest::CONFIRM_DELIVERY_DATE).await?;
    info.time_of_delivery = Some(crate::services::date_reconciler::format_delivery_date(&raw)?);

    let button = if finalize {
        dest::CONFIRM_FINALIZE
    } else {
        dest::CONFIRM_SAVE
    };
    driver.click(button).await?;

    if !is_in_state(driver, WizardState::Submitted).await? {
        retry::try_again(driver, WizardState::Submitted.marker(), button).await?;
    }
    Ok(())
}

/// 打开新订单向导并绑定来源订单号
pub async fn open_wizard(driver: &dyn UiDriver, order_nr: &str) -> EngineResult<()> {
    driver.click(dest::NEW_ORDER_BUTTON).await?;
    if !is_in_state(driver, WizardState::AddressEntry).await? {
        retry::try_again(
            driver,
            WizardState::AddressEntry.marker(),
            dest::NEW_ORDER_BUTTON,
        )
        .await?;
    }
    type_and_verify(driver, dest::ORDER_NR_FIELD, order_nr).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ScriptedDriver;

    #[tokio::test]
    async fn test_type_and_verify_first_write_sticks() {
        let driver = ScriptedDriver::new();

        type_and_verify(&driver, "#field", "42").await.unwrap();

        assert_eq!(driver.type_count("#field"), 1);
        assert_eq!(driver.typed("#field").unwrap(), "42");
    }

    #[tokio::test]
    async fn test_type_and_verify_rewrites_once_then_fails() {
        // 页面永远回读别的值：重写恰好一次后报错
        let driver = ScriptedDriver::new().with_forced_readback("#field", "garbled");

        let err = type_and_verify(&driver, "#field", "42").await.unwrap_err();

        assert_eq!(driver.type_count("#field"), 2);
        match err {
            EngineError::InputMismatch {
                selector,
                expected,
                actual,
            } => {
                assert_eq!(selector, "#field");
                assert_eq!(expected, "42");
                assert_eq!(actual, "garbled");
            }
            other => panic!("意外的错误类型: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_select_model_first_match_wins() {
        let driver = ScriptedDriver::new().with_text_list(
            dest::MODEL_LIST_ITEMS,
            ["Ortowear Classic 2", "Ortowear Classic 2 XL", "SoftStep"],
        );

        select_model(&driver, "Classic 2").await.unwrap();

        // 第一个命中（nth-child 从 1 开始）
        assert_eq!(driver.clicks(), vec![dest::model_item(0)]);
    }

    #[tokio::test]
    async fn test_select_model_zero_matches_is_error() {
        let driver =
            ScriptedDriver::new().with_text_list(dest::MODEL_LIST_ITEMS, ["SoftStep", "AirFlex"]);

        let err = select_model(&driver, "Classic 2").await.unwrap_err();

        assert!(matches!(err, EngineError::ModelNotFound { .. }));
        assert!(driver.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_fill_address_eu_takes_shortcut() {
        let mut info = OrderInfo::new("12345");
        info.customer_name = "Jan de Vries".to_string();
        info.delivery_address = vec![
            "Main St 5".to_string(),
            "1000 Amsterdam".to_string(),
            "Nederland".to_string(),
        ];
        info.is_eu = true;

        let driver = ScriptedDriver::new();
        fill_address(&driver, &info).await.unwrap();

        assert_eq!(driver.clicks(), vec![dest::ADDRESS_ORTOWEAR_SHORTCUT]);
        assert!(driver.typed(dest::ADDRESS_STREET).is_none());
    }

    #[tokio::test]
    async fn test_fill_address_non_eu_never_touches_shortcut() {
        let mut info = OrderInfo::new("12345");
        info.customer_name = "Kari Nordmann".to_string();
        info.delivery_address = vec![
            "Main St 5".to_string(),
            "1000 Oslo".to_string(),
            "Oslo, Norway".to_string(),
        ];
        info.is_eu = false;

        let driver = ScriptedDriver::new();
        fill_address(&driver, &info).await.unwrap();

        assert_eq!(driver.click_count(dest::ADDRESS_ORTOWEAR_SHORTCUT), 0);
        assert_eq!(driver.typed(dest::ADDRESS_STREET).unwrap(), "Main St 5");
        assert_eq!(driver.typed(dest::ADDRESS_COUNTRY).unwrap(), "Oslo, Norway");
    }

    #[tokio::test]
    async fn test_advance_happy_path() {
        let driver = ScriptedDriver::new().with_present(dest::STEP_USAGE_MARKER);

        let to = advance(&driver, WizardState::AddressEntry).await.unwrap();

        assert_eq!(to, WizardState::UsageEnvironment);
        assert_eq!(driver.click_count(dest::STEP_ADDRESS_NEXT), 1);
    }

    #[tokio::test]
    async fn test_advance_hands_off_to_retry_controller() {
        // 标记第 3 次检查才出现：advance 点一次，重试控制器再点一次
        let driver = ScriptedDriver::new().with_visible_after(dest::STEP_USAGE_MARKER, 2);

        let to = advance(&driver, WizardState::AddressEntry).await.unwrap();

        assert_eq!(to, WizardState::UsageEnvironment);
        assert!(driver.click_count(dest::STEP_ADDRESS_NEXT) >= 2);
    }

    #[test]
    fn test_transition_table_is_linear() {
        let mut state = WizardState::AddressEntry;
        let mut seen = vec![state];
        while let Some(next) = state.successor() {
            seen.push(next);
            state = next;
        }
        assert_eq!(
            seen,
            vec![
                WizardState::AddressEntry,
                WizardState::UsageEnvironment,
                WizardState::ModelAndSize,
                WizardState::Supplement,
                WizardState::Confirmation,
                WizardState::Submitted,
            ]
        );
    }
}
