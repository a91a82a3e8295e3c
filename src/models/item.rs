use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::scan_input::NormalizedScan;

/// 清单行ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ItemId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 计价方式: 按件 / 按重量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SaleUnit {
    Unit,
    /// 称重商品，保留原始的两个标记
    Weight {
        sale_unit_type: Option<String>,
        weight_unit: Option<String>,
    },
}

impl SaleUnit {
    /// 任一标记存在即视为称重商品
    pub fn from_tags(sale_unit_type: Option<String>, weight_unit: Option<String>) -> Self {
        if sale_unit_type.is_none() && weight_unit.is_none() {
            SaleUnit::Unit
        } else {
            SaleUnit::Weight {
                sale_unit_type,
                weight_unit,
            }
        }
    }

    pub fn is_weight_typed(&self) -> bool {
        matches!(self, SaleUnit::Weight { .. })
    }
}

/// 扫码清单中的一行
///
/// `total_price` 只能通过数量/单价的变更重新计算，不可单独赋值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedItem {
    id: ItemId,
    product_id: Option<String>,
    barcode: String,
    product_name: String,
    quantity: u32,
    unit_price: BigDecimal,
    total_price: BigDecimal,
    scanned_at: DateTime<Utc>,
    sale_unit: SaleUnit,
    supplier: Option<String>,
    site: Option<String>,
    notes: Option<String>,
}

impl ScannedItem {
    pub(crate) fn from_scan(scan: NormalizedScan, now: DateTime<Utc>) -> Self {
        let total_price = &scan.unit_price * &BigDecimal::from(scan.quantity);
        Self {
            id: ItemId::new(),
            product_id: scan.product_id,
            barcode: scan.barcode,
            product_name: scan.product_name,
            quantity: scan.quantity,
            unit_price: scan.unit_price,
            total_price,
            scanned_at: now,
            sale_unit: scan.sale_unit,
            supplier: scan.supplier,
            site: scan.site,
            notes: scan.notes,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> &BigDecimal {
        &self.unit_price
    }

    pub fn total_price(&self) -> &BigDecimal {
        &self.total_price
    }

    pub fn scanned_at(&self) -> DateTime<Utc> {
        self.scanned_at
    }

    pub fn sale_unit(&self) -> &SaleUnit {
        &self.sale_unit
    }

    pub fn is_weight_typed(&self) -> bool {
        self.sale_unit.is_weight_typed()
    }

    pub fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }

    pub fn site(&self) -> Option<&str> {
        self.site.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// 按条码或商品ID判断是否为同一件按件商品
    pub(crate) fn matches_unit(&self, barcode: &str, product_id: Option<&str>) -> bool {
        if self.is_weight_typed() {
            return false;
        }
        if self.barcode == barcode {
            return true;
        }
        match (self.product_id(), product_id) {
            (Some(own), Some(other)) => !own.is_empty() && own == other,
            _ => false,
        }
    }

    /// 重复扫码: 数量 +1；已达上限时不变并返回 None
    pub(crate) fn increment(&mut self, now: DateTime<Utc>) -> Option<u32> {
        self.quantity = self.quantity.checked_add(1)?;
        self.scanned_at = now;
        self.recompute_total();
        Some(self.quantity)
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.recompute_total();
    }

    pub(crate) fn set_unit_price(&mut self, unit_price: BigDecimal) {
        self.unit_price = unit_price;
        self.recompute_total();
    }

    pub(crate) fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    fn recompute_total(&mut self) {
        self.total_price = &self.unit_price * &BigDecimal::from(self.quantity);
    }
}
