//! 订单类型枚举
//!
//! 类型标签来自来源门户结果表的原始文本。OSA / SOS 能被识别，
//! 但引擎不实现它们的提取与填单流程（路由到它们属于致命错误）。

/// 订单类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    /// 定制鞋（全字段）
    Sts,
    /// 鞋垫（窄字段集）
    InsS,
    /// 识别但不支持
    Osa,
    /// 识别但不支持
    Sos,
}

impl OrderType {
    /// 表格中的原始标签
    pub fn label(self) -> &'static str {
        match self {
            OrderType::Sts => "STS",
            OrderType::InsS => "INS-S",
            OrderType::Osa => "OSA",
            OrderType::Sos => "SOS",
        }
    }

    /// 引擎是否实现了该类型的提取与填单流程
    pub fn is_supported(self) -> bool {
        matches!(self, OrderType::Sts | OrderType::InsS)
    }

    /// 从表格标签解析（精确匹配）
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "STS" => Some(OrderType::Sts),
            "INS-S" => Some(OrderType::InsS),
            "OSA" => Some(OrderType::Osa),
            "SOS" => Some(OrderType::Sos),
            _ => None,
        }
    }

    /// 容错解析：去掉空白、忽略大小写后再精确匹配
    pub fn find(s: &str) -> Option<Self> {
        Self::from_label(s.trim().to_uppercase().as_str())
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_exact() {
        assert_eq!(OrderType::from_label("STS"), Some(OrderType::Sts));
        assert_eq!(OrderType::from_label("INS-S"), Some(OrderType::InsS));
        assert_eq!(OrderType::from_label("OSA"), Some(OrderType::Osa));
        assert_eq!(OrderType::from_label("SOS"), Some(OrderType::Sos));
        assert_eq!(OrderType::from_label("sts"), None);
        assert_eq!(OrderType::from_label("XYZ"), None);
    }

    #[test]
    fn test_find_tolerant() {
        assert_eq!(OrderType::find("  sts "), Some(OrderType::Sts));
        assert_eq!(OrderType::find("ins-s"), Some(OrderType::InsS));
        assert_eq!(OrderType::find("unknown"), None);
    }

    #[test]
    fn test_supported_flags() {
        assert!(OrderType::Sts.is_supported());
        assert!(OrderType::InsS.is_supported());
        assert!(!OrderType::Osa.is_supported());
        assert!(!OrderType::Sos.is_supported());
    }
}
