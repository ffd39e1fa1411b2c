//! 订单分配器 - 业务能力层
//!
//! 对已注册的订单在来源门户上排期：重新定位订单、打开分配子页、
//! 把日历对账到目标日期、选择"送回给谁"（按 is_eu）和供应商代码
//! （按 has_insole）。两处选择都是封闭的二选一，查 `portal::selectors`
//! 里的固定表，不在这里硬编码分支。

use chrono::{Datelike, Days, Local, NaiveDate};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::infrastructure::{UiDriver, DEFAULT_TIMEOUT_MS};
use crate::models::OrderRecord;
use crate::portal::selectors::{return_to_for, source, supplier_for};
use crate::services::date_reconciler::{
    adjust_month, adjust_year, insole_delivery_date, parse_displayed_year,
};
use crate::services::order_locator::OrderLocator;
use crate::services::retry;

/// 订单分配器
pub struct OrderAllocator {
    dev_mode: bool,
    finalize: bool,
}

impl OrderAllocator {
    pub fn new(dev_mode: bool, finalize: bool) -> Self {
        Self { dev_mode, finalize }
    }

    /// 为订单排期，返回实际设置的交付日期
    pub async fn allocate(
        &self,
        driver: &dyn UiDriver,
        order: &OrderRecord,
        date_buffer_days: Option<i64>,
    ) -> EngineResult<NaiveDate> {
        let order_nr = order.order_nr();
        info!("[订单 {}] 📅 开始分配", order_nr);

        // 负缓冲天数是批次文件写错了，碰页面之前就拒绝
        if let Some(days) = date_buffer_days {
            if days < 0 {
                return Err(EngineError::NegativeDateBuffer { days });
            }
        }

        // 重新定位订单并进入详情页
        let row = OrderLocator::new().locate(driver, order_nr).await?;
        driver.click(&row.selector).await?;

        // 打开分配子页
        driver.click(source::ALLOCATE_TAB).await?;
        if !driver
            .element_present(source::ALLOCATE_MARKER, true, DEFAULT_TIMEOUT_MS)
            .await?
        {
            retry::try_again(driver, source::ALLOCATE_MARKER, source::ALLOCATE_TAB).await?;
        }

        // 计算目标日期并把日历对账过去
        let target = self.target_date(order, date_buffer_days);
        debug!("[订单 {}] 目标交付日期: {}", order_nr, target);

        let displayed_year = parse_displayed_year(&driver.read_text(source::CAL_YEAR).await?)?;
        adjust_year(driver, target.year(), displayed_year).await?;

        let displayed_month = driver.read_text(source::CAL_MONTH).await?;
        adjust_month(driver, target, &displayed_month).await?;

        driver.click(&source::cal_day_cell(target.day())).await?;

        // 封闭的二选一：送回给谁（is_eu）、供应商代码（has_insole）
        driver
            .select_dropdown_by_value(
                source::RETURN_TO_DROPDOWN,
                return_to_for(order.info().is_eu),
            )
            .await?;
        driver
            .select_dropdown_by_value(source::SUPPLIER_DROPDOWN, supplier_for(order.has_insole()))
            .await?;

        if self.finalize && !self.dev_mode {
            driver.click(source::ALLOCATE_SAVE).await?;
        } else {
            debug!("[订单 {}] 跳过保存（dev_mode 或未要求最终提交）", order_nr);
        }

        info!("[订单 {}] ✅ 分配完成: {}", order_nr, target);
        Ok(target)
    }

    /// 目标日期规则
    ///
    /// 开发模式 → 今天 + 7 天（合成日期）；
    /// 调用方给了缓冲天数 → 注册时的交付日期 + 缓冲；
    /// 没给缓冲且订单带鞋垫 → 鞋垫工作日规则（周三/四 → 下周五，否则下周三）；
    /// 其余 → 注册时的交付日期原样。
    fn target_date(&self, order: &OrderRecord, date_buffer_days: Option<i64>) -> NaiveDate {
        let today = Local::now().date_naive();
        if self.dev_mode {
            return today + Days::new(7);
        }

        let base = order.info().time_of_delivery.unwrap_or(today);
        match date_buffer_days {
            Some(days) if days > 0 => base + Days::new(days as u64),
            // 0 天缓冲等同未给；负数在 allocate 入口已被拒绝
            Some(_) => base,
            None if order.has_insole() => insole_delivery_date(base),
            None => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ScriptedDriver;
    use crate::models::{OrderInfo, StsOrder};

    fn sts_order(is_eu: bool, has_insole: bool, delivery: Option<NaiveDate>) -> OrderRecord {
        let mut info = OrderInfo::new("12345");
        info.customer_name = "Kari Nordmann".to_string();
        info.delivery_address = vec![
            "Main St 5".to_string(),
            "1000 Oslo".to_string(),
            "Oslo, Norway".to_string(),
        ];
        info.is_eu = is_eu;
        info.time_of_delivery = delivery;
        OrderRecord::Sts(StsOrder {
            info,
            model: "Classic 2".to_string(),
            sole: "Vibram".to_string(),
            toe_cap: "Steel".to_string(),
            size_left: "42".to_string(),
            size_right: "42".to_string(),
            width_left: "10".to_string(),
            width_right: "10".to_string(),
            has_insole,
        })
    }

    /// 日历已经停在目标年月的分配子页
    fn allocation_page(year: &str, month: &str) -> ScriptedDriver {
        ScriptedDriver::new()
            .with_row("12345", "#ordretabell tbody tr:nth-child(1)", "STS")
            .with_present(source::ALLOCATE_MARKER)
            .with_text(source::CAL_YEAR, year)
            .with_text(source::CAL_MONTH, month)
    }

    #[tokio::test]
    async fn test_allocate_selects_table_driven_choices() {
        // 2025-06-10 是周二，带鞋垫 → 鞋垫规则推到下周三 2025-06-11
        let delivery = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let driver = allocation_page("2025", "June");
        let order = sts_order(false, true, Some(delivery));

        let target = OrderAllocator::new(false, true)
            .allocate(&driver, &order, None)
            .await
            .unwrap();

        assert_eq!(target, NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());
        // 非 EU → 送回寄件方；带鞋垫 → 供应商 711
        assert_eq!(driver.selected(source::RETURN_TO_DROPDOWN).unwrap(), "sender");
        assert_eq!(driver.selected(source::SUPPLIER_DROPDOWN).unwrap(), "711");
        assert_eq!(driver.click_count(&source::cal_day_cell(11)), 1);
        assert_eq!(driver.click_count(source::ALLOCATE_SAVE), 1);
    }

    #[tokio::test]
    async fn test_allocate_with_buffer_days() {
        let delivery = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let driver = allocation_page("2025", "June");
        let order = sts_order(true, false, Some(delivery));

        let target = OrderAllocator::new(false, true)
            .allocate(&driver, &order, Some(4))
            .await
            .unwrap();

        assert_eq!(target, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert_eq!(driver.selected(source::RETURN_TO_DROPDOWN).unwrap(), "client");
        assert_eq!(driver.selected(source::SUPPLIER_DROPDOWN).unwrap(), "710");
    }

    #[tokio::test]
    async fn test_dev_mode_skips_save_click() {
        let today = Local::now().date_naive();
        let target_expected = today + Days::new(7);
        let driver = allocation_page(
            &target_expected.format("%Y").to_string(),
            &target_expected.format("%B").to_string(),
        );
        let order = sts_order(true, false, None);

        let target = OrderAllocator::new(true, true)
            .allocate(&driver, &order, None)
            .await
            .unwrap();

        assert_eq!(target, target_expected);
        assert_eq!(driver.click_count(source::ALLOCATE_SAVE), 0);
    }

    #[tokio::test]
    async fn test_negative_buffer_days_rejected_before_any_click() {
        let delivery = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let driver = allocation_page("2025", "June");
        let order = sts_order(true, false, Some(delivery));

        let err = OrderAllocator::new(false, true)
            .allocate(&driver, &order, Some(-3))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "date buffer days must not be negative, got -3"
        );
        assert!(driver.clicks().is_empty());
    }

    #[tokio::test]
    async fn test_allocate_unknown_order_fails_with_locate_error() {
        let driver = ScriptedDriver::new();
        let order = sts_order(true, false, None);

        let err = OrderAllocator::new(false, true)
            .allocate(&driver, &order, None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "could not find order 12345");
    }
}
