//! 两个门户的固定选择器
//!
//! 引擎假定目标页面布局是固定且带版本的（见 `LAYOUT_VERSION`），
//! 布局变化时在这里集中更新；选择器失效按"快速失败"处理，
//! 不做内容寻址或视觉比对等通用抓取健壮性。

/// 选择器适配的页面布局版本（仅用于日志与排障）
pub const LAYOUT_VERSION: &str = "2024-11";

// ========== 来源门户 ==========

pub mod source {
    /// 登录表单
    pub const LOGIN_USERNAME: &str = "#login-form input[name='username']";
    pub const LOGIN_PASSWORD: &str = "#login-form input[name='password']";
    pub const LOGIN_SUBMIT: &str = "#login-form button[type='submit']";
    /// 登录成功后的落地页标记
    pub const LANDING_MARKER: &str = "#ordre-oversikt";

    /// 订单结果表的搜索框
    pub const SEARCH_FIELD: &str = "#ordretabell_filter input";
    /// DataTables 的 processing 指示器
    pub const PROCESSING_INDICATOR: &str = "#ordretabell_processing";
    /// 空结果时表格唯一的信息行
    pub const EMPTY_ROW: &str = "#ordretabell td.dataTables_empty";

    /// "无记录"哨兵文本的两个已知本地化变体
    pub const NO_RECORDS_SENTINELS: [&str; 2] = [
        "No matching records found",
        "Ingen rader samsvarer med filteret",
    ];

    /// 订单详情页标题
    pub const DETAIL_HEADING: &str = "#ordredetaljer > h2";

    /// 详情页通用信息单元格（按固定位置读取）
    pub const ORDER_NR_CELL: &str = "#ordre-info tr:nth-child(1) td:nth-child(2)";
    pub const CUSTOMER_CELL: &str = "#ordre-info tr:nth-child(2) td:nth-child(2)";
    pub const ADDRESS_CELLS: [&str; 3] = [
        "#ordre-info tr:nth-child(3) td:nth-child(2)",
        "#ordre-info tr:nth-child(4) td:nth-child(2)",
        "#ordre-info tr:nth-child(5) td:nth-child(2)",
    ];

    /// STS 专属单元格
    pub const STS_MODEL_CELL: &str = "#sts-detaljer tr.modell td:nth-child(2)";
    pub const STS_SOLE_CELL: &str = "#sts-detaljer tr.saale td:nth-child(2)";
    pub const STS_TOE_CAP_CELL: &str = "#sts-detaljer tr.taakappe td:nth-child(2)";
    pub const STS_SIZE_LEFT_CELL: &str = "#sts-maal tr.storrelse td.venstre";
    pub const STS_SIZE_RIGHT_CELL: &str = "#sts-maal tr.storrelse td.hoyre";
    pub const STS_WIDTH_LEFT_CELL: &str = "#sts-maal tr.bredde td.venstre";
    pub const STS_WIDTH_RIGHT_CELL: &str = "#sts-maal tr.bredde td.hoyre";
    pub const STS_INSOLE_CELL: &str = "#sts-detaljer tr.saaler td:nth-child(2)";

    /// INS-S 专属单元格（来源页上结构化数据更少）
    pub const INSS_MODEL_CELL: &str = "#inss-detaljer tr.modell td:nth-child(2)";
    pub const INSS_SIZE_LEFT_CELL: &str = "#inss-maal tr.storrelse td.venstre";
    pub const INSS_SIZE_RIGHT_CELL: &str = "#inss-maal tr.storrelse td.hoyre";

    // ----- 分配子页 -----

    /// 打开分配子页的标签
    pub const ALLOCATE_TAB: &str = "a[href='#tildeling']";
    /// 分配子页的标记
    pub const ALLOCATE_MARKER: &str = "#tildeling";

    /// 日历控件：当前显示的年份 / 月份，以及唯一的"前进"控制
    pub const CAL_YEAR: &str = "#tildeling .datepicker-switch .year";
    pub const CAL_MONTH: &str = "#tildeling .datepicker-switch .month";
    pub const CAL_NEXT: &str = "#tildeling .datepicker .next";

    /// 日历中某一天的单元格
    pub fn cal_day_cell(day: u32) -> String {
        format!("#tildeling .datepicker td.day[data-day='{}']", day)
    }

    /// "送回给谁"下拉框与供应商下拉框
    pub const RETURN_TO_DROPDOWN: &str = "#tildeling select[name='retur-til']";
    pub const SUPPLIER_DROPDOWN: &str = "#tildeling select[name='leverandor']";
    /// 保存分配
    pub const ALLOCATE_SAVE: &str = "#tildeling button.lagre";
}

// ========== 目的门户（向导式多步表单） ==========

pub mod destination {
    /// 登录表单
    pub const LOGIN_USERNAME: &str = "#login input[name='email']";
    pub const LOGIN_PASSWORD: &str = "#login input[name='password']";
    pub const LOGIN_SUBMIT: &str = "#login button.sign-in";
    pub const LANDING_MARKER: &str = "#dashboard";

    /// 新建订单入口
    pub const NEW_ORDER_BUTTON: &str = "#dashboard a.new-order";
    /// 新建订单时输入来源订单号的字段
    pub const ORDER_NR_FIELD: &str = "#wizard input[name='order-nr']";

    // ----- 向导各步骤的标记元素与"下一步"控制 -----

    pub const STEP_ADDRESS_MARKER: &str = "#wizard .step-address";
    pub const STEP_USAGE_MARKER: &str = "#wizard .step-usage";
    pub const STEP_MODEL_MARKER: &str = "#wizard .step-model";
    pub const STEP_SUPPLEMENT_MARKER: &str = "#wizard .step-supplement";
    pub const STEP_CONFIRM_MARKER: &str = "#wizard .step-confirm";
    pub const RECEIPT_MARKER: &str = "#order-receipt";

    pub const STEP_ADDRESS_NEXT: &str = "#wizard .step-address button.next";
    pub const STEP_USAGE_NEXT: &str = "#wizard .step-usage button.next";
    pub const STEP_MODEL_NEXT: &str = "#wizard .step-model button.next";
    pub const STEP_SUPPLEMENT_NEXT: &str = "#wizard .step-supplement button.next";

    // ----- 地址步骤 -----

    /// EU 订单走 Ortowear 中转地址的快捷路径
    pub const ADDRESS_ORTOWEAR_SHORTCUT: &str = "#wizard .step-address a.ortowear-address";
    /// 非 EU（挪威）订单逐字段填写完整地址
    pub const ADDRESS_NAME: &str = "#wizard .step-address input[name='name']";
    pub const ADDRESS_STREET: &str = "#wizard .step-address input[name='street']";
    pub const ADDRESS_POSTAL: &str = "#wizard .step-address input[name='postal']";
    pub const ADDRESS_COUNTRY: &str = "#wizard .step-address input[name='country']";

    // ----- 使用环境步骤 -----

    pub const USAGE_ENV_DROPDOWN: &str = "#wizard .step-usage select[name='environment']";
    /// 固定的使用环境档位
    pub const USAGE_ENV_DEFAULT: &str = "Arbeid";

    // ----- 模型与尺码步骤 -----

    /// 页面上展示的模型名称列表
    pub const MODEL_LIST_ITEMS: &str = "#wizard .step-model ul.models li";

    /// 第 index 个模型条目（从 0 开始）
    pub fn model_item(index: usize) -> String {
        format!("#wizard .step-model ul.models li:nth-child({})", index + 1)
    }

    pub const SIZE_LEFT_FIELD: &str = "#wizard .step-model input[name='size-left']";
    pub const SIZE_RIGHT_FIELD: &str = "#wizard .step-model input[name='size-right']";
    pub const WIDTH_LEFT_FIELD: &str = "#wizard .step-model input[name='width-left']";
    pub const WIDTH_RIGHT_FIELD: &str = "#wizard .step-model input[name='width-right']";
    pub const SOLE_DROPDOWN: &str = "#wizard .step-model select[name='sole']";
    pub const TOE_CAP_DROPDOWN: &str = "#wizard .step-model select[name='toe-cap']";

    // ----- 附件 / 鞋垫步骤 -----

    /// 打开鞋垫弹窗的选项
    pub const INSOLE_OPTION: &str = "#wizard .step-supplement input[name='insole']";
    pub const INSOLE_MODAL_MARKER: &str = "#insole-modal";
    pub const INSOLE_MODAL_CONFIRM: &str = "#insole-modal button.ok";

    // ----- 确认步骤 -----

    /// 确认页回显的交付日期（斜杠分隔）
    pub const CONFIRM_DELIVERY_DATE: &str = "#wizard .step-confirm .delivery-date";
    /// 保存订单（开发模式下跳过）
    pub const CONFIRM_SAVE: &str = "#wizard .step-confirm button.save";
    /// 最终提交
    pub const CONFIRM_FINALIZE: &str = "#wizard .step-confirm button.finalize";
}

// ========== 分配阶段的固定二选一表 ==========
// 按来源代码的风格保持表驱动，便于将来加入新订单类型。

/// "送回给谁"的选择，按 is_eu 取值
pub struct ReturnToChoice {
    pub is_eu: bool,
    /// 下拉框的 value
    pub dropdown_value: &'static str,
}

pub const RETURN_TO_TABLE: [ReturnToChoice; 2] = [
    ReturnToChoice {
        is_eu: true,
        dropdown_value: "client",
    },
    ReturnToChoice {
        is_eu: false,
        dropdown_value: "sender",
    },
];

/// 供应商代码的选择，按 has_insole 取值
pub struct SupplierChoice {
    pub has_insole: bool,
    /// 下拉框的 value（固定的两个供应商代码）
    pub code: &'static str,
}

pub const SUPPLIER_TABLE: [SupplierChoice; 2] = [
    SupplierChoice {
        has_insole: true,
        code: "711",
    },
    SupplierChoice {
        has_insole: false,
        code: "710",
    },
];

/// 查"送回给谁"表
pub fn return_to_for(is_eu: bool) -> &'static str {
    RETURN_TO_TABLE
        .iter()
        .find(|c| c.is_eu == is_eu)
        .map(|c| c.dropdown_value)
        .unwrap_or(RETURN_TO_TABLE[1].dropdown_value)
}

/// 查供应商表
pub fn supplier_for(has_insole: bool) -> &'static str {
    SUPPLIER_TABLE
        .iter()
        .find(|c| c.has_insole == has_insole)
        .map(|c| c.code)
        .unwrap_or(SUPPLIER_TABLE[1].code)
}
