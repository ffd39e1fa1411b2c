use order_auto_register::browser::connect_to_browser_and_page;
use order_auto_register::config::Config;
use order_auto_register::infrastructure::ScriptedDriver;
use order_auto_register::models::{BatchOrder, Stage};
use order_auto_register::orchestrator::order_processor::process_order;
use order_auto_register::portal::selectors::{destination, source};
use order_auto_register::services::MemoryAuditStore;
use order_auto_register::utils;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

/// 布置两个门户的完整页面状态：来源门户上有一个非 EU、无鞋垫的
/// STS 订单 12345，目的门户的向导每步标记立即出现，分配日历停在
/// 2025 年 6 月。
fn scripted_portals() -> ScriptedDriver {
    ScriptedDriver::new()
        // 来源门户登录
        .with_present(source::LOGIN_USERNAME)
        .with_present(source::LANDING_MARKER)
        // 结果表
        .with_row("12345", "#ordretabell tbody tr:nth-child(1)", "STS")
        // 详情页
        .with_present(source::DETAIL_HEADING)
        .with_text(source::ORDER_NR_CELL, "12345")
        .with_text(source::CUSTOMER_CELL, "Kari Nordmann")
        .with_text(source::ADDRESS_CELLS[0], "Main St 5")
        .with_text(source::ADDRESS_CELLS[1], "1000 Oslo")
        .with_text(source::ADDRESS_CELLS[2], "Oslo, Norway")
        .with_text(source::STS_MODEL_CELL, "Classic 2")
        .with_text(source::STS_SOLE_CELL, "Vibram")
        .with_text(source::STS_TOE_CAP_CELL, "Steel")
        .with_text(source::STS_SIZE_LEFT_CELL, "42")
        .with_text(source::STS_SIZE_RIGHT_CELL, "42")
        .with_text(source::STS_WIDTH_LEFT_CELL, "10")
        .with_text(source::STS_WIDTH_RIGHT_CELL, "10")
        .with_text(source::STS_INSOLE_CELL, "Nei")
        // 目的门户登录与向导
        .with_present(destination::LOGIN_USERNAME)
        .with_present(destination::LANDING_MARKER)
        .with_present(destination::STEP_ADDRESS_MARKER)
        .with_present(destination::STEP_USAGE_MARKER)
        .with_present(destination::STEP_MODEL_MARKER)
        .with_present(destination::STEP_SUPPLEMENT_MARKER)
        .with_present(destination::STEP_CONFIRM_MARKER)
        .with_present(destination::RECEIPT_MARKER)
        .with_text_list(
            destination::MODEL_LIST_ITEMS,
            ["Ortowear Classic 2", "SoftStep"],
        )
        .with_text(destination::CONFIRM_DELIVERY_DATE, "10/6/2025")
        // 分配子页
        .with_present(source::ALLOCATE_MARKER)
        .with_text(source::CAL_YEAR, "2025")
        .with_text(source::CAL_MONTH, "June")
}

fn test_config() -> Config {
    Config {
        dev_mode: false,
        finalize: true,
        source_username: "operator@ortowear.no".to_string(),
        source_password: "pw".to_string(),
        destination_username: "operator@ortowear.no".to_string(),
        destination_password: "pw".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_full_order_journey_all_three_stages() {
    let driver = scripted_portals();
    let store = MemoryAuditStore::new();
    let order = BatchOrder {
        order_nr: "12345".to_string(),
        date_buffer_days: None,
    };

    let result = process_order(
        &driver,
        &store,
        &test_config(),
        &order,
        1,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // 三个阶段全部成功，审计日志按阶段顺序各一条
    assert!(result.last_stage_ok());
    assert_eq!(result.logs.len(), 3);
    assert_eq!(result.logs[0].stage, Stage::GetOrderInfo);
    assert_eq!(result.logs[1].stage, Stage::RegisterOrder);
    assert_eq!(result.logs[2].stage, Stage::AllocateOrder);
    assert!(result.logs.iter().all(|e| e.status));
    assert_eq!(store.entries().len(), 3);

    // 提取：挪威地址 → 非 EU
    let order_record = result.order.unwrap();
    assert!(!order_record.info().is_eu);
    assert_eq!(
        order_record.info().time_of_delivery,
        Some(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap())
    );

    // 录入：非 EU 走逐字段地址，模型第一个命中，最终提交
    assert_eq!(driver.click_count(destination::ADDRESS_ORTOWEAR_SHORTCUT), 0);
    assert_eq!(driver.typed(destination::ADDRESS_COUNTRY).unwrap(), "Oslo, Norway");
    assert_eq!(driver.click_count(&destination::model_item(0)), 1);
    assert_eq!(driver.click_count(destination::CONFIRM_FINALIZE), 1);

    // 分配：日历已在目标年月，点 10 号；无鞋垫 → 供应商 710，
    // 非 EU → 送回寄件方
    assert_eq!(driver.click_count(source::CAL_NEXT), 0);
    assert_eq!(driver.click_count(&source::cal_day_cell(10)), 1);
    assert_eq!(driver.selected(source::SUPPLIER_DROPDOWN).unwrap(), "710");
    assert_eq!(driver.selected(source::RETURN_TO_DROPDOWN).unwrap(), "sender");
    assert_eq!(driver.click_count(source::ALLOCATE_SAVE), 1);
}

#[tokio::test]
async fn test_unsupported_order_type_stops_after_first_stage() {
    let driver = ScriptedDriver::new()
        .with_present(source::LOGIN_USERNAME)
        .with_present(source::LANDING_MARKER)
        .with_row("555", "#ordretabell tbody tr:nth-child(1)", "OSA");
    let store = MemoryAuditStore::new();
    let order = BatchOrder {
        order_nr: "555".to_string(),
        date_buffer_days: None,
    };

    let result = process_order(
        &driver,
        &store,
        &test_config(),
        &order,
        1,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(result.logs.len(), 1);
    assert!(!result.last_stage_ok());
    assert_eq!(
        result.logs[0].error.as_deref(),
        Some("unsupported order type: OSA")
    );
    // 向导从未被打开
    assert_eq!(driver.click_count(destination::NEW_ORDER_BUTTON), 0);
}

#[tokio::test]
async fn test_extraction_failure_names_the_missing_field() {
    // 详情页缺少鞋头单元格
    let driver = scripted_portals();
    driver.set_text(source::STS_TOE_CAP_CELL, "");
    let store = MemoryAuditStore::new();
    let order = BatchOrder {
        order_nr: "12345".to_string(),
        date_buffer_days: None,
    };

    let result = process_order(
        &driver,
        &store,
        &test_config(),
        &order,
        1,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(result.logs.len(), 1);
    assert_eq!(
        result.logs[0].error.as_deref(),
        Some("order is missing mandatory field: toe cap")
    );
    // 第二阶段从未开始：目的门户登录按钮没被点过
    assert_eq!(driver.click_count(destination::LOGIN_SUBMIT), 0);
}

#[tokio::test]
async fn test_dev_mode_journey_skips_all_final_saves() {
    let today_plus_7 = chrono::Local::now().date_naive() + chrono::Days::new(7);
    let driver = scripted_portals()
        .with_text(source::CAL_YEAR, today_plus_7.format("%Y").to_string())
        .with_text(source::CAL_MONTH, today_plus_7.format("%B").to_string());
    let store = MemoryAuditStore::new();
    let order = BatchOrder {
        order_nr: "12345".to_string(),
        date_buffer_days: None,
    };
    let config = Config {
        dev_mode: true,
        ..test_config()
    };

    let result = process_order(
        &driver,
        &store,
        &config,
        &order,
        1,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(result.last_stage_ok());
    // 开发模式：合成交付日期，不点任何最终保存
    assert_eq!(
        result.order.unwrap().info().time_of_delivery,
        Some(today_plus_7)
    );
    assert_eq!(driver.click_count(destination::CONFIRM_SAVE), 0);
    assert_eq!(driver.click_count(destination::CONFIRM_FINALIZE), 0);
    assert_eq!(driver.click_count(source::ALLOCATE_SAVE), 0);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_connection() {
    // 初始化日志
    utils::logging::init(true);

    // 加载配置
    let config = Config::from_env();

    // 测试浏览器连接
    let result =
        connect_to_browser_and_page(config.browser_debug_port, Some(&config.source_portal_url))
            .await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_single_order_live() {
    use order_auto_register::infrastructure::PortalDriver;

    // 初始化日志
    utils::logging::init(true);

    // 加载配置
    let config = Config::from_env();

    // 连接浏览器
    let (_browser, page) =
        connect_to_browser_and_page(config.browser_debug_port, Some(&config.source_portal_url))
            .await
            .expect("连接浏览器失败");

    let driver = PortalDriver::new(page);
    let store = MemoryAuditStore::new();

    // 注意：请根据实际情况修改订单号
    let order = BatchOrder {
        order_nr: "12345".to_string(),
        date_buffer_days: None,
    };

    let result = process_order(&driver, &store, &config, &order, 1, &CancellationToken::new())
        .await
        .expect("处理订单失败");

    assert!(result.last_stage_ok(), "订单处理应该成功");
}
