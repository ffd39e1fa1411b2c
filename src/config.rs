use crate::models::Credentials;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 来源门户（订单列表 + 分配日历）URL
    pub source_portal_url: String,
    /// 目的门户（多步向导）URL
    pub destination_portal_url: String,
    /// 审计持久化服务的基础 URL；为空则只写内存
    pub audit_base_url: String,
    /// TOML 批次文件存放目录
    pub toml_folder: String,
    /// 运行日志文件路径
    pub output_log_file: String,
    /// 开发模式：跳过最终保存点击，合成交付日期
    pub dev_mode: bool,
    /// 是否最终提交（false 时只保存草稿）
    pub finalize: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 复用已运行浏览器的调试端口；0 表示自己启动无头浏览器
    pub browser_debug_port: u16,
    // --- 凭证 ---
    pub source_username: String,
    pub source_password: String,
    pub destination_username: String,
    pub destination_password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_portal_url: "https://ordre.example.no/login".to_string(),
            destination_portal_url: "https://portal.ortowear.example/login".to_string(),
            audit_base_url: String::new(),
            toml_folder: "batches".to_string(),
            output_log_file: "output.txt".to_string(),
            dev_mode: true,
            finalize: false,
            verbose_logging: false,
            browser_debug_port: 0,
            source_username: String::new(),
            source_password: String::new(),
            destination_username: String::new(),
            destination_password: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            source_portal_url: std::env::var("SOURCE_PORTAL_URL").unwrap_or(default.source_portal_url),
            destination_portal_url: std::env::var("DESTINATION_PORTAL_URL").unwrap_or(default.destination_portal_url),
            audit_base_url: std::env::var("AUDIT_BASE_URL").unwrap_or(default.audit_base_url),
            toml_folder: std::env::var("TOML_FOLDER").unwrap_or(default.toml_folder),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            dev_mode: std::env::var("DEV_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dev_mode),
            finalize: std::env::var("FINALIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.finalize),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            source_username: std::env::var("SOURCE_USERNAME").unwrap_or(default.source_username),
            source_password: std::env::var("SOURCE_PASSWORD").unwrap_or(default.source_password),
            destination_username: std::env::var("DESTINATION_USERNAME").unwrap_or(default.destination_username),
            destination_password: std::env::var("DESTINATION_PASSWORD").unwrap_or(default.destination_password),
        }
    }

    /// 来源门户凭证
    pub fn source_credentials(&self) -> Credentials {
        Credentials {
            username: self.source_username.clone(),
            password: self.source_password.clone(),
        }
    }

    /// 目的门户凭证
    pub fn destination_credentials(&self) -> Credentials {
        Credentials {
            username: self.destination_username.clone(),
            password: self.destination_password.clone(),
        }
    }
}
