//! 门户会话 - 业务能力层
//!
//! 登录来源 / 目的门户。登录失败和落错页面都属于导航类错误，
//! 由编排层整批终止，不按单个订单处理。

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::infrastructure::{UiDriver, DEFAULT_TIMEOUT_MS};
use crate::models::Credentials;
use crate::portal::selectors::{destination, source};
use crate::services::form_filler::type_and_verify;

/// 登录来源门户
pub async fn login_source(
    driver: &dyn UiDriver,
    base_url: &str,
    credentials: &Credentials,
) -> EngineResult<()> {
    login(
        driver,
        base_url,
        credentials,
        source::LOGIN_USERNAME,
        source::LOGIN_PASSWORD,
        source::LOGIN_SUBMIT,
        source::LANDING_MARKER,
    )
    .await
}

/// 登录目的门户
pub async fn login_destination(
    driver: &dyn UiDriver,
    base_url: &str,
    credentials: &Credentials,
) -> EngineResult<()> {
    login(
        driver,
        base_url,
        credentials,
        destination::LOGIN_USERNAME,
        destination::LOGIN_PASSWORD,
        destination::LOGIN_SUBMIT,
        destination::LANDING_MARKER,
    )
    .await
}

async fn login(
    driver: &dyn UiDriver,
    base_url: &str,
    credentials: &Credentials,
    username_field: &str,
    password_field: &str,
    submit_button: &str,
    landing_marker: &str,
) -> EngineResult<()> {
    info!("🔐 登录门户: {}", base_url);
    driver.navigate_to(base_url).await?;

    // 登录表单没出现说明落错了页面
    if !driver
        .element_present(username_field, true, DEFAULT_TIMEOUT_MS)
        .await?
    {
        return Err(EngineError::Navigation {
            expected: base_url.to_string(),
            actual: driver.current_url().await?,
        });
    }

    fill_login_field(driver, base_url, username_field, &credentials.username).await?;
    fill_login_field(driver, base_url, password_field, &credentials.password).await?;
    driver.click(submit_button).await?;

    if !driver
        .element_present(landing_marker, true, DEFAULT_TIMEOUT_MS)
        .await?
    {
        return Err(EngineError::LoginRejected {
            username: credentials.username.clone(),
        });
    }

    info!("✅ 登录成功: {}", credentials.username);
    Ok(())
}

/// 登录表单上的输入失败也是导航类错误
///
/// 吞键 / 控件缺失说明登录页本身不对劲，按整批终止处理，
/// 不能落进"驱动崩溃"那条路。
async fn fill_login_field(
    driver: &dyn UiDriver,
    base_url: &str,
    selector: &str,
    value: &str,
) -> EngineResult<()> {
    match type_and_verify(driver, selector, value).await {
        Err(EngineError::InputMismatch { .. }) | Err(EngineError::ElementNotFound { .. }) => {
            Err(EngineError::Navigation {
                expected: base_url.to_string(),
                actual: driver.current_url().await?,
            })
        }
        other => other,
    }
}
