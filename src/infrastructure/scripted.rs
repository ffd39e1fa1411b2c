//! 脚本化驱动 - 测试替身
//!
//! 不依赖真实浏览器：页面状态由测试脚本预先布置，
//! 驱动记录所有点击 / 输入 / 选择，供断言使用。
//!
//! 关键机制：
//! - `with_text_sequence`：同一选择器的连续 `read_text` 依次返回
//!   序列中的值（停留在最后一个），用于模拟日历年份 / 月份随点击推进；
//! - `with_visible_after`：前 n 次可见性检查返回 false，之后返回 true，
//!   用于测试重试控制器的边界行为；
//! - `with_forced_readback`：输入框回读固定值，无视写入，
//!   用于测试"输入-校验-重写一次"模式的失败路径。

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use crate::error::{EngineError, EngineResult};
use crate::infrastructure::driver::UiDriver;
use crate::models::TargetAndSelector;

#[derive(Default)]
struct ScriptedState {
    current_url: String,
    texts: HashMap<String, String>,
    text_sequences: HashMap<String, VecDeque<String>>,
    text_lists: HashMap<String, Vec<String>>,
    inputs: HashMap<String, String>,
    forced_readback: HashMap<String, String>,
    dropdowns: HashMap<String, String>,
    present: HashSet<String>,
    visible_after: HashMap<String, usize>,
    check_counts: HashMap<String, usize>,
    clicks: Vec<String>,
    type_events: Vec<(String, String)>,
    rows: Vec<TargetAndSelector>,
}

/// 脚本化驱动
#[derive(Default)]
pub struct ScriptedDriver {
    state: Mutex<ScriptedState>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 布置页面状态 ==========

    /// 固定某个选择器的文本
    pub fn with_text(self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.state
            .lock()
            .unwrap()
            .texts
            .insert(selector.into(), text.into());
        self
    }

    /// 同一选择器的连续读取依次返回序列值（停留在最后一个）
    pub fn with_text_sequence<I, S>(self, selector: impl Into<String>, seq: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().unwrap().text_sequences.insert(
            selector.into(),
            seq.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// 固定某个选择器的文本列表（read_texts）
    pub fn with_text_list<I, S>(self, selector: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().unwrap().text_lists.insert(
            selector.into(),
            items.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// 标记元素存在（可见）
    pub fn with_present(self, selector: impl Into<String>) -> Self {
        self.state.lock().unwrap().present.insert(selector.into());
        self
    }

    /// 前 n 次可见性检查返回 false，之后返回 true
    pub fn with_visible_after(self, selector: impl Into<String>, failed_checks: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .visible_after
            .insert(selector.into(), failed_checks);
        self
    }

    /// 输入框回读固定值（模拟页面吞掉输入）
    pub fn with_forced_readback(
        self,
        selector: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.state
            .lock()
            .unwrap()
            .forced_readback
            .insert(selector.into(), value.into());
        self
    }

    /// 预置结果表中的一行
    pub fn with_row(
        self,
        target: impl Into<String>,
        selector: impl Into<String>,
        type_label: impl Into<String>,
    ) -> Self {
        self.state.lock().unwrap().rows.push(TargetAndSelector {
            target: target.into(),
            selector: selector.into(),
            type_label: type_label.into(),
        });
        self
    }

    /// 运行中途修改文本（模拟页面状态变化）
    pub fn set_text(&self, selector: impl Into<String>, text: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .texts
            .insert(selector.into(), text.into());
    }

    // ========== 断言辅助 ==========

    /// 全部点击记录（按顺序）
    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    /// 某个选择器被点击的次数
    pub fn click_count(&self, selector: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .clicks
            .iter()
            .filter(|s| s.as_str() == selector)
            .count()
    }

    /// 最终写入某输入框的值
    pub fn typed(&self, selector: &str) -> Option<String> {
        self.state.lock().unwrap().inputs.get(selector).cloned()
    }

    /// 某输入框被写入的次数
    pub fn type_count(&self, selector: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .type_events
            .iter()
            .filter(|(s, _)| s.as_str() == selector)
            .count()
    }

    /// 下拉框最终选择的 value
    pub fn selected(&self, selector: &str) -> Option<String> {
        self.state.lock().unwrap().dropdowns.get(selector).cloned()
    }
}

#[async_trait]
impl UiDriver for ScriptedDriver {
    async fn navigate_to(&self, url: &str) -> EngineResult<()> {
        self.state.lock().unwrap().current_url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> EngineResult<String> {
        Ok(self.state.lock().unwrap().current_url.clone())
    }

    async fn click(&self, selector: &str) -> EngineResult<()> {
        self.state.lock().unwrap().clicks.push(selector.to_string());
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .type_events
            .push((selector.to_string(), text.to_string()));
        state.inputs.insert(selector.to_string(), text.to_string());
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
        _visible: bool,
        _timeout_ms: u64,
    ) -> EngineResult<bool> {
        let mut state = self.state.lock().unwrap();
        let count = state
            .check_counts
            .entry(selector.to_string())
            .and_modify(|c| *c += 1)
            .or_insert(1)
            .to_owned();

        if let Some(&threshold) = state.visible_after.get(selector) {
            return Ok(count > threshold);
        }
        Ok(state.present.contains(selector)
            || state.texts.contains_key(selector)
            || state.text_sequences.contains_key(selector))
    }

    async fn read_text(&self, selector: &str) -> EngineResult<String> {
        let mut state = self.state.lock().unwrap();
        if let Some(seq) = state.text_sequences.get_mut(selector) {
            if seq.len() > 1 {
                return Ok(seq.pop_front().unwrap_or_default());
            }
            if let Some(last) = seq.front() {
                return Ok(last.clone());
            }
        }
        state
            .texts
            .get(selector)
            .cloned()
            .ok_or_else(|| EngineError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    async fn read_texts(&self, selector: &str) -> EngineResult<Vec<String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .text_lists
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn read_input_value(&self, selector: &str) -> EngineResult<String> {
        let state = self.state.lock().unwrap();
        if let Some(forced) = state.forced_readback.get(selector) {
            return Ok(forced.clone());
        }
        Ok(state.inputs.get(selector).cloned().unwrap_or_default())
    }

    async fn select_dropdown_by_text(&self, selector: &str, text: &str) -> EngineResult<()> {
        self.state
            .lock()
            .unwrap()
            .dropdowns
            .insert(selector.to_string(), text.to_string());
        Ok(())
    }

    async fn select_dropdown_by_value(&self, selector: &str, value: &str) -> EngineResult<()> {
        self.state
            .lock()
            .unwrap()
            .dropdowns
            .insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn selected_value(&self, selector: &str) -> EngineResult<String> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .dropdowns
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn locate_table_row(&self, order_nr: &str) -> EngineResult<Option<TargetAndSelector>> {
        // 与真实驱动同样的 superstring 规则：第一个结构匹配获胜
        let state = self.state.lock().unwrap();
        Ok(state
            .rows
            .iter()
            .find(|row| !row.target.is_empty() && order_nr.contains(&row.target))
            .cloned())
    }
}
