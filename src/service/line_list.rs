use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::ListError;
use crate::models::{ItemId, NormalizedScan, ScannedItem};

/// 插入或合并的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Inserted(ItemId),
    Merged { id: ItemId, quantity: u32 },
}

/// 有序扫码清单 (插入顺序，只追加；删除和清空需显式调用)
#[derive(Debug, Clone, Default)]
pub struct LineList {
    items: IndexMap<ItemId, ScannedItem>,
}

impl LineList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> impl Iterator<Item = &ScannedItem> {
        self.items.values()
    }

    pub fn get(&self, id: ItemId) -> Option<&ScannedItem> {
        self.items.get(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 查找可合并的按件商品行 (条码或商品ID相同)
    pub fn find_unit_line(&self, barcode: &str, product_id: Option<&str>) -> Option<ItemId> {
        self.items
            .values()
            .find(|item| item.matches_unit(barcode, product_id))
            .map(ScannedItem::id)
    }

    /// 重复扫码: 对应行数量 +1，返回新数量
    pub fn increment(&mut self, id: ItemId, now: DateTime<Utc>) -> Result<u32, ListError> {
        let item = self.items.get_mut(&id).ok_or(ListError::ItemNotFound(id))?;
        item.increment(now).ok_or(ListError::QuantityLimitReached(id))
    }

    /// 窗口外的插入流程: 按件商品先找可合并行，称重商品总是新增一行
    ///
    /// 可合并行的数量已达上限时返回错误，清单不变
    pub fn insert_or_merge(&mut self, scan: NormalizedScan, now: DateTime<Utc>) -> Result<Placement, ListError> {
        if !scan.is_weight_typed() {
            if let Some(id) = self.find_unit_line(&scan.barcode, scan.product_id.as_deref()) {
                let quantity = self.increment(id, now)?;
                return Ok(Placement::Merged { id, quantity });
            }
        }
        Ok(Placement::Inserted(self.append(scan, now)))
    }

    pub fn append(&mut self, scan: NormalizedScan, now: DateTime<Utc>) -> ItemId {
        let item = ScannedItem::from_scan(scan, now);
        let id = item.id();
        self.items.insert(id, item);
        id
    }

    pub fn update_quantity(&mut self, id: ItemId, quantity: i64) -> Result<&ScannedItem, ListError> {
        if quantity <= 0 {
            return Err(ListError::NonPositiveQuantity(quantity));
        }
        let quantity = u32::try_from(quantity).map_err(|_| ListError::QuantityTooLarge(quantity))?;
        let item = self.items.get_mut(&id).ok_or(ListError::ItemNotFound(id))?;
        item.set_quantity(quantity);
        Ok(&*item)
    }

    pub fn update_unit_price(&mut self, id: ItemId, unit_price: BigDecimal) -> Result<&ScannedItem, ListError> {
        if unit_price < BigDecimal::zero() {
            return Err(ListError::NegativePrice(unit_price));
        }
        let item = self.items.get_mut(&id).ok_or(ListError::ItemNotFound(id))?;
        item.set_unit_price(unit_price);
        Ok(&*item)
    }

    pub fn update_notes(&mut self, id: ItemId, notes: Option<String>) -> Result<&ScannedItem, ListError> {
        let item = self.items.get_mut(&id).ok_or(ListError::ItemNotFound(id))?;
        item.set_notes(notes);
        Ok(&*item)
    }

    /// 删除一行，不存在时不做任何事
    pub fn remove(&mut self, id: ItemId) -> Option<ScannedItem> {
        self.items.shift_remove(&id)
    }

    /// 清空，返回删除的行数
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    pub fn total_items(&self) -> u64 {
        self.items.values().map(|item| u64::from(item.quantity())).sum()
    }

    pub fn total_value(&self) -> BigDecimal {
        self.items
            .values()
            .fold(BigDecimal::zero(), |acc, item| acc + item.total_price())
    }

    pub fn product_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_product_in_list(&self, barcode: &str) -> bool {
        self.items.values().any(|item| item.barcode() == barcode)
    }

    /// 某条码的数量合计 (称重商品可能有多行)
    pub fn product_quantity(&self, barcode: &str) -> u64 {
        self.items
            .values()
            .filter(|item| item.barcode() == barcode)
            .map(|item| u64::from(item.quantity()))
            .sum()
    }
}
