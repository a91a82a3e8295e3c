use serde::{Deserialize, Serialize};
use std::fmt;

/// 业务场景 (每个扫码会话固定一个)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanContext {
    /// 收银 / 销售
    Sales,
    /// 盘点
    Inventory,
    /// 收货
    Reception,
    /// 调拨
    Transfer,
}

impl ScanContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanContext::Sales => "sales",
            ScanContext::Inventory => "inventory",
            ScanContext::Reception => "reception",
            ScanContext::Transfer => "transfer",
        }
    }

    pub fn all() -> [ScanContext; 4] {
        [
            ScanContext::Sales,
            ScanContext::Inventory,
            ScanContext::Reception,
            ScanContext::Transfer,
        ]
    }
}

impl fmt::Display for ScanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
