use bigdecimal::BigDecimal;
use serde::Serialize;

/// 清单汇总 (只读查询结果)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSummary {
    /// 数量合计
    pub total_items: u64,
    /// 金额合计 (单价 × 数量)
    pub total_value: BigDecimal,
    /// 行数
    pub product_count: usize,
    pub stats: ScanStats,
}

/// 会话内扫码计数，清空清单时不重置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub inserted: u64,
    pub merged: u64,
    pub rejected: u64,
    pub bounced: u64,
    pub in_flight: u64,
    /// 对应行数量已达上限
    pub at_limit: u64,
}

impl ScanStats {
    pub fn dropped(&self) -> u64 {
        self.rejected + self.bounced + self.in_flight + self.at_limit
    }
}

/// 待确认的清空请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearRequest {
    /// 生成请求时的清单版本号
    pub generation: u64,
    pub product_count: usize,
    pub total_items: u64,
    pub total_value: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClearOutcome {
    Cleared { removed: usize },
    ConfirmationRequired(ClearRequest),
}
