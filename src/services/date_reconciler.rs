//! 日期对账 - 业务能力层
//!
//! 把分配子页的日历控件推进到目标日期，外加几条纯日期算法。
//! 日历只有"前进"一个控制，没有回退路径：目标日期已经过去时
//! 直接报错，而不是静默截断。
//!
//! 历史实现用递归加计数器，这里改为带显式计数的迭代循环 ——
//! 行为一致，且边界可以直接测试。

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::sync::OnceLock;

use crate::error::{EngineError, EngineResult};
use crate::infrastructure::UiDriver;
use crate::portal::selectors::source;

/// 日历推进的循环上限（历史实现的 100 次上限，保持不变）
pub const MAX_CALENDAR_STEPS: u32 = 100;

/// 月份名称 → 月份序号
///
/// 目的门户的日历按英文渲染月份，全名和三字母缩写都接受。
/// 本地化假设记录在 DESIGN.md。
static MONTH_NUMBERS: phf::Map<&'static str, u32> = phf::phf_map! {
    "january" => 1, "jan" => 1,
    "february" => 2, "feb" => 2,
    "march" => 3, "mar" => 3,
    "april" => 4, "apr" => 4,
    "may" => 5,
    "june" => 6, "jun" => 6,
    "july" => 7, "jul" => 7,
    "august" => 8, "aug" => 8,
    "september" => 9, "sep" => 9,
    "october" => 10, "oct" => 10,
    "november" => 11, "nov" => 11,
    "december" => 12, "dec" => 12,
};

/// 解析日历显示的月份名称
pub fn month_number(name: &str) -> EngineResult<u32> {
    let normalized = name.trim().to_lowercase();
    MONTH_NUMBERS
        .get(normalized.as_str())
        .copied()
        .ok_or_else(|| EngineError::BadMonthName {
            name: name.to_string(),
        })
}

/// 从日历标题文本里抠出年份数字
pub fn parse_displayed_year(text: &str) -> EngineResult<i32> {
    static YEAR_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = YEAR_RE.get_or_init(|| regex::Regex::new(r"\d{4}").expect("静态正则"));
    re.find(text)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| EngineError::BadDeliveryDate {
            raw: text.to_string(),
        })
}

/// 把日历推进到目标年份
///
/// `displayed_year` 是调用方刚从控件读到的当前年份；之后每点一次
/// "前进"就重新读一次。显示年份超过目标时报"过去日期"错误，
/// 循环超出 [`MAX_CALENDAR_STEPS`] 报 loop overload。
pub async fn adjust_year(
    driver: &dyn UiDriver,
    target_year: i32,
    displayed_year: i32,
) -> EngineResult<()> {
    let mut displayed = displayed_year;
    let mut attempts: u32 = 0;

    loop {
        if displayed == target_year {
            return Ok(());
        }
        if displayed > target_year {
            return Err(EngineError::DeliveryDateInPast {
                target: target_year.to_string(),
                displayed: displayed.to_string(),
            });
        }
        if attempts >= MAX_CALENDAR_STEPS {
            return Err(EngineError::LoopOverload {
                unit: "year",
                attempts,
            });
        }

        driver.click(source::CAL_NEXT).await?;
        attempts += 1;
        displayed = parse_displayed_year(&driver.read_text(source::CAL_YEAR).await?)?;
    }
}

/// 把日历推进到目标月份（年份已经对齐之后调用）
pub async fn adjust_month(
    driver: &dyn UiDriver,
    target_date: NaiveDate,
    displayed_month_name: &str,
) -> EngineResult<()> {
    let target_month = target_date.month();
    let mut displayed = month_number(displayed_month_name)?;
    let mut attempts: u32 = 0;

    loop {
        if displayed == target_month {
            return Ok(());
        }
        if displayed > target_month {
            return Err(EngineError::DeliveryDateInPast {
                target: target_date.format("%Y-%m").to_string(),
                displayed: format!("month {}", displayed),
            });
        }
        if attempts >= MAX_CALENDAR_STEPS {
            return Err(EngineError::LoopOverload {
                unit: "month",
                attempts,
            });
        }

        driver.click(source::CAL_NEXT).await?;
        attempts += 1;
        displayed = month_number(&driver.read_text(source::CAL_MONTH).await?)?;
    }
}

/// 严格晚于 `date` 的下一个指定工作日
pub fn next_day_of_week(date: NaiveDate, target: Weekday) -> NaiveDate {
    let current = i64::from(date.weekday().num_days_from_sunday());
    let wanted = i64::from(target.num_days_from_sunday());
    let days_ahead = ((7 + wanted - current - 1) % 7) + 1;
    date + Days::new(days_ahead as u64)
}

/// 带鞋垫订单的交付日期规则
///
/// 原始交付日落在周三或周四 → 推到下一个周五，否则推到下一个周三。
/// 这是供应链的截单规则，属于引擎之外的固定业务常量。
pub fn insole_delivery_date(raw: NaiveDate) -> NaiveDate {
    match raw.weekday() {
        Weekday::Wed | Weekday::Thu => next_day_of_week(raw, Weekday::Fri),
        _ => next_day_of_week(raw, Weekday::Wed),
    }
}

/// 解析确认弹窗回显的斜杠分隔日期
///
/// 规范字段顺序是日/月/年（历史代码的两处调用点不一致，
/// 这里统一为来源门户所在地区的 dd/mm/yyyy，见 DESIGN.md）。
pub fn format_delivery_date(raw: &str) -> EngineResult<NaiveDate> {
    let bad = || EngineError::BadDeliveryDate {
        raw: raw.to_string(),
    };

    let parts: Vec<&str> = raw.trim().split('/').collect();
    if parts.len() != 3 {
        return Err(bad());
    }
    let day: u32 = parts[0].trim().parse().map_err(|_| bad())?;
    let month: u32 = parts[1].trim().parse().map_err(|_| bad())?;
    let year: i32 = parts[2].trim().parse().map_err(|_| bad())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(bad)
}
