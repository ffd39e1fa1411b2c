//! UI 自动化驱动 - 基础设施层
//!
//! `UiDriver` 是引擎消费的原子页面操作能力（点击、输入、等待、读文本、
//! 查下拉框状态、定位表格行）。驱动只返回布尔 / 字符串 / 失败，
//! 从不解释业务含义。
//!
//! `PortalDriver` 持有唯一的 Page 资源，是它的 chromiumoxide 实现：
//! 写操作走协议层，读操作统一走 eval()。

use async_trait::async_trait;
use chromiumoxide::Page;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::TargetAndSelector;

/// 驱动等待类调用的默认超时（毫秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// 元素轮询间隔（毫秒）
const POLL_INTERVAL_MS: u64 = 100;

/// UI 自动化驱动能力
///
/// 所有操作都可能以"未找到 / 超时"失败；引擎把这类失败当作普通
/// 控制流处理，不当作崩溃。
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// 导航到指定 URL
    async fn navigate_to(&self, url: &str) -> EngineResult<()>;

    /// 当前页面 URL
    async fn current_url(&self) -> EngineResult<String>;

    /// 点击元素
    async fn click(&self, selector: &str) -> EngineResult<()>;

    /// 清空并输入文本
    async fn type_text(&self, selector: &str, text: &str) -> EngineResult<()>;

    /// 等待元素出现，超时则失败
    async fn wait_for(&self, selector: &str, timeout_ms: u64) -> EngineResult<()>;

    /// 元素是否存在且满足可见性要求；超时返回 false，不报错
    async fn element_present(
        &self,
        selector: &str,
        visible: bool,
        timeout_ms: u64,
    ) -> EngineResult<bool>;

    /// 读取元素文本
    async fn read_text(&self, selector: &str) -> EngineResult<String>;

    /// 读取多个元素的文本（按文档顺序）
    async fn read_texts(&self, selector: &str) -> EngineResult<Vec<String>>;

    /// 读取输入框当前值
    async fn read_input_value(&self, selector: &str) -> EngineResult<String>;

    /// 按可见文本选择下拉项
    async fn select_dropdown_by_text(&self, selector: &str, text: &str) -> EngineResult<()>;

    /// 按 value 选择下拉项
    async fn select_dropdown_by_value(&self, selector: &str, value: &str) -> EngineResult<()>;

    /// 下拉框当前选中的 value
    async fn selected_value(&self, selector: &str) -> EngineResult<String>;

    /// 在来源门户结果表中定位订单行
    ///
    /// 匹配规则：订单号包含行内打印的号码片段（superstring 匹配），
    /// 第一个结构匹配获胜。返回 None 表示没有任何行匹配。
    async fn locate_table_row(&self, order_nr: &str) -> EngineResult<Option<TargetAndSelector>>;
}

/// chromiumoxide 驱动实现
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露原子页面操作
/// - 不认识订单 / 向导
/// - 不处理业务流程
pub struct PortalDriver {
    page: Page,
}

impl PortalDriver {
    /// 创建新的驱动
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    async fn eval(&self, js_code: impl Into<String>) -> EngineResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value().map_err(|_| EngineError::ElementNotFound {
            selector: "<eval>".to_string(),
        })?;
        Ok(json_value)
    }

    /// 把选择器安全地嵌入 JS 字符串字面量
    fn js_str(s: &str) -> String {
        serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
    }
}

#[async_trait]
impl UiDriver for PortalDriver {
    async fn navigate_to(&self, url: &str) -> EngineResult<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> EngineResult<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> EngineResult<()> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| EngineError::ElementNotFound {
                    selector: selector.to_string(),
                })?;
        element.click().await?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> EngineResult<()> {
        // 先清空旧值再输入，避免拼接
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.value = '';
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = Self::js_str(selector)
        );
        let cleared = self.eval(js).await?;
        if cleared != JsonValue::Bool(true) {
            return Err(EngineError::ElementNotFound {
                selector: selector.to_string(),
            });
        }

        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| EngineError::ElementNotFound {
                    selector: selector.to_string(),
                })?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout_ms: u64) -> EngineResult<()> {
        if self.element_present(selector, false, timeout_ms).await? {
            Ok(())
        } else {
            Err(EngineError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn element_present(
        &self,
        selector: &str,
        visible: bool,
        timeout_ms: u64,
    ) -> EngineResult<bool> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                if ({visible}) return el.offsetParent !== null;
                return true;
            }})()"#,
            sel = Self::js_str(selector),
            visible = visible
        );

        let deadline = timeout_ms / POLL_INTERVAL_MS;
        for _ in 0..deadline.max(1) {
            if self.eval(js.clone()).await? == JsonValue::Bool(true) {
                return Ok(true);
            }
            sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
        Ok(false)
    }

    async fn read_text(&self, selector: &str) -> EngineResult<String> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? el.innerText : null;
            }})()"#,
            sel = Self::js_str(selector)
        );
        match self.eval(js).await? {
            JsonValue::String(s) => Ok(s.trim().to_string()),
            _ => Err(EngineError::ElementNotFound {
                selector: selector.to_string(),
            }),
        }
    }

    async fn read_texts(&self, selector: &str) -> EngineResult<Vec<String>> {
        let js = format!(
            r#"Array.from(document.querySelectorAll({sel})).map(el => el.innerText.trim())"#,
            sel = Self::js_str(selector)
        );
        let value = self.eval(js).await?;
        let texts: Vec<String> = serde_json::from_value(value).unwrap_or_default();
        Ok(texts)
    }

    async fn read_input_value(&self, selector: &str) -> EngineResult<String> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? el.value : null;
            }})()"#,
            sel = Self::js_str(selector)
        );
        match self.eval(js).await? {
            JsonValue::String(s) => Ok(s),
            _ => Err(EngineError::ElementNotFound {
                selector: selector.to_string(),
            }),
        }
    }

    async fn select_dropdown_by_text(&self, selector: &str, text: &str) -> EngineResult<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const option = Array.from(el.options).find(o => o.text.trim() === {text});
                if (!option) return false;
                el.value = option.value;
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = Self::js_str(selector),
            text = Self::js_str(text)
        );
        if self.eval(js).await? == JsonValue::Bool(true) {
            Ok(())
        } else {
            Err(EngineError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn select_dropdown_by_value(&self, selector: &str, value: &str) -> EngineResult<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.value = {value};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = Self::js_str(selector),
            value = Self::js_str(value)
        );
        if self.eval(js).await? == JsonValue::Bool(true) {
            Ok(())
        } else {
            Err(EngineError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn selected_value(&self, selector: &str) -> EngineResult<String> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                return el ? el.value : null;
            }})()"#,
            sel = Self::js_str(selector)
        );
        match self.eval(js).await? {
            JsonValue::String(s) => Ok(s),
            _ => Err(EngineError::ElementNotFound {
                selector: selector.to_string(),
            }),
        }
    }

    async fn locate_table_row(&self, order_nr: &str) -> EngineResult<Option<TargetAndSelector>> {
        // superstring 匹配：请求的订单号包含行内打印的片段。
        // 多行命中时第一个结构匹配获胜（既定策略，不是继承的偶然行为）。
        let js = format!(
            r#"(() => {{
                const rows = document.querySelectorAll('#ordretabell tbody tr');
                for (let i = 0; i < rows.length; i++) {{
                    const cells = rows[i].querySelectorAll('td');
                    if (cells.length < 2) continue;
                    const fragment = cells[0].innerText.trim();
                    if (fragment.length > 0 && {order_nr}.includes(fragment)) {{
                        return {{
                            target: fragment,
                            selector: '#ordretabell tbody tr:nth-child(' + (i + 1) + ')',
                            type_label: cells[1].innerText.trim()
                        }};
                    }}
                }}
                return null;
            }})()"#,
            order_nr = Self::js_str(order_nr)
        );
        let value = self.eval(js).await?;
        if value.is_null() {
            return Ok(None);
        }
        let row: TargetAndSelector =
            serde_json::from_value(value).map_err(|_| EngineError::ElementNotFound {
                selector: "#ordretabell tbody tr".to_string(),
            })?;
        Ok(Some(row))
    }
}
