use bigdecimal::BigDecimal;
use serde::Serialize;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::ScanConfig;
use crate::error::{ListError, ScanRejection};
use crate::models::{
    ClearOutcome, ClearRequest, ItemId, ListSummary, ProductData, ScanContext, ScanInput,
    ScanStats, ScannedItem,
};
use crate::service::debounce::{GateDecision, ScanGate};
use crate::service::line_list::{LineList, Placement};
use crate::service::validator::ContextValidator;

/// 一次扫码的处理结果 (扫码永不报错，只会被丢弃)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Inserted { id: ItemId },
    Merged { id: ItemId, quantity: u32 },
    Dropped { reason: DropReason },
}

impl ScanOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, ScanOutcome::Dropped { .. })
    }

    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            ScanOutcome::Inserted { id } | ScanOutcome::Merged { id, .. } => Some(*id),
            ScanOutcome::Dropped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    /// 场景校验未通过
    Rejected { rejection: ScanRejection },
    /// 防抖窗口内且清单中没有对应行
    Bounce,
    /// 同一条码正在插入中
    InFlight,
    /// 可合并行的数量已达上限
    QuantityLimit { id: ItemId },
}

/// 连续扫码聚合器 (一个扫码会话一个实例)
pub struct ScanAggregator {
    validator: ContextValidator,
    gate: ScanGate,
    list: LineList,
    clock: Arc<dyn Clock>,
    stats: ScanStats,
    generation: u64,
}

impl ScanAggregator {
    pub fn new(context: ScanContext, config: &ScanConfig) -> Self {
        Self::with_clock(context, config, Arc::new(SystemClock))
    }

    pub fn with_clock(context: ScanContext, config: &ScanConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            validator: ContextValidator::new(context, config.placeholder_name.clone()),
            gate: ScanGate::new(config.debounce_ms, config.lock_release_ms),
            list: LineList::new(),
            clock,
            stats: ScanStats::default(),
            generation: 0,
        }
    }

    pub fn context(&self) -> ScanContext {
        self.validator.context()
    }

    /// 处理一次扫码: 原始条码 + 商品查询结果
    pub fn scan_product(&mut self, raw_barcode: &str, product: ProductData) -> ScanOutcome {
        let input = ScanInput::from_product(self.context(), raw_barcode, product);
        self.scan(input)
    }

    /// 处理一次扫码: 场景校验 -> 防抖/加锁 -> 清单变更
    pub fn scan(&mut self, input: ScanInput) -> ScanOutcome {
        let now = self.clock.now();

        let record = match self.validator.validate(input) {
            Ok(record) => record,
            Err(rejection) => {
                tracing::info!(
                    context = %self.context(),
                    reason = %rejection,
                    "Scan dropped by context validation"
                );
                self.stats.rejected += 1;
                return ScanOutcome::Dropped {
                    reason: DropReason::Rejected { rejection },
                };
            }
        };

        // 称重商品: 不防抖、不加锁、不合并
        if record.is_weight_typed() {
            let id = self.list.append(record, now);
            self.stats.inserted += 1;
            self.generation += 1;
            tracing::debug!(item_id = %id, "Weight-typed scan appended");
            return ScanOutcome::Inserted { id };
        }

        let barcode = record.barcode.clone();
        match self.gate.check(&barcode, now) {
            GateDecision::WithinWindow => {
                // 窗口内: 有行则合并，无行则视为噪声
                let Some(id) = self.list.find_unit_line(&barcode, record.product_id.as_deref()) else {
                    tracing::info!(barcode = %barcode, "Scan dropped as bounce, no line to merge into");
                    self.stats.bounced += 1;
                    return ScanOutcome::Dropped {
                        reason: DropReason::Bounce,
                    };
                };
                let quantity = match self.list.increment(id, now) {
                    Ok(quantity) => quantity,
                    Err(e) => return self.drop_unmerged(&barcode, e),
                };
                self.gate.accept(&barcode, now);
                self.stats.merged += 1;
                self.generation += 1;
                tracing::debug!(barcode = %barcode, item_id = %id, quantity, "Repeat scan merged within debounce window");
                ScanOutcome::Merged { id, quantity }
            }
            GateDecision::InFlight => {
                tracing::debug!(barcode = %barcode, "Scan dropped, barcode already in flight");
                self.stats.in_flight += 1;
                ScanOutcome::Dropped {
                    reason: DropReason::InFlight,
                }
            }
            GateDecision::Proceed => {
                let placement = match self.list.insert_or_merge(record, now) {
                    Ok(placement) => placement,
                    Err(e) => return self.drop_unmerged(&barcode, e),
                };
                self.gate.accept(&barcode, now);
                self.generation += 1;
                match placement {
                    Placement::Inserted(id) => {
                        self.stats.inserted += 1;
                        tracing::debug!(barcode = %barcode, item_id = %id, "New line inserted");
                        ScanOutcome::Inserted { id }
                    }
                    Placement::Merged { id, quantity } => {
                        self.stats.merged += 1;
                        tracing::debug!(barcode = %barcode, item_id = %id, quantity, "Scan merged into existing line");
                        ScanOutcome::Merged { id, quantity }
                    }
                }
            }
        }
    }

    /// 合并失败: 行已达数量上限，或在合并前消失
    fn drop_unmerged(&mut self, barcode: &str, error: ListError) -> ScanOutcome {
        match error {
            ListError::QuantityLimitReached(id) => {
                tracing::warn!(barcode = %barcode, item_id = %id, "Scan dropped, line is at the maximum quantity");
                self.stats.at_limit += 1;
                ScanOutcome::Dropped {
                    reason: DropReason::QuantityLimit { id },
                }
            }
            e => {
                tracing::info!(barcode = %barcode, "Scan dropped as bounce: {}", e);
                self.stats.bounced += 1;
                ScanOutcome::Dropped {
                    reason: DropReason::Bounce,
                }
            }
        }
    }

    /// 当前清单快照 (插入顺序)
    pub fn items(&self) -> Vec<ScannedItem> {
        self.list.items().cloned().collect()
    }

    pub fn get_item(&self, id: ItemId) -> Option<&ScannedItem> {
        self.list.get(id)
    }

    pub fn update_quantity(&mut self, id: ItemId, quantity: i64) -> Result<&ScannedItem, ListError> {
        match self.list.update_quantity(id, quantity) {
            Ok(item) => {
                self.generation += 1;
                Ok(item)
            }
            Err(e) => {
                tracing::warn!(item_id = %id, quantity, "Quantity update rejected: {}", e);
                Err(e)
            }
        }
    }

    pub fn update_unit_price(&mut self, id: ItemId, unit_price: BigDecimal) -> Result<&ScannedItem, ListError> {
        match self.list.update_unit_price(id, unit_price) {
            Ok(item) => {
                self.generation += 1;
                Ok(item)
            }
            Err(e) => {
                tracing::warn!(item_id = %id, "Unit price update rejected: {}", e);
                Err(e)
            }
        }
    }

    /// 销售行不记录备注
    pub fn update_notes(&mut self, id: ItemId, notes: Option<String>) -> Result<&ScannedItem, ListError> {
        if self.context() == ScanContext::Sales {
            return Err(ListError::NotesNotAllowed(ScanContext::Sales));
        }
        let item = self.list.update_notes(id, notes)?;
        self.generation += 1;
        Ok(item)
    }

    /// 删除一行；ID 不存在时为空操作
    pub fn remove_item(&mut self, id: ItemId) -> Option<ScannedItem> {
        let removed = self.list.remove(id);
        if removed.is_some() {
            self.generation += 1;
            tracing::debug!(item_id = %id, "Line removed");
        }
        removed
    }

    /// 清空清单: silent 立即清空，否则返回待确认的请求
    pub fn clear_list(&mut self, silent: bool) -> ClearOutcome {
        if silent {
            ClearOutcome::Cleared {
                removed: self.clear_now(),
            }
        } else {
            ClearOutcome::ConfirmationRequired(self.request_clear())
        }
    }

    pub fn request_clear(&self) -> ClearRequest {
        ClearRequest {
            generation: self.generation,
            product_count: self.list.product_count(),
            total_items: self.list.total_items(),
            total_value: self.list.total_value(),
        }
    }

    /// 确认清空；请求之后清单有变化则拒绝
    pub fn confirm_clear(&mut self, request: &ClearRequest) -> Result<usize, ListError> {
        self.confirm_clear_generation(request.generation)
    }

    pub fn confirm_clear_generation(&mut self, generation: u64) -> Result<usize, ListError> {
        if generation != self.generation {
            tracing::warn!(
                requested = generation,
                current = self.generation,
                "Stale clear request rejected"
            );
            return Err(ListError::StaleClearRequest {
                requested: generation,
                current: self.generation,
            });
        }
        Ok(self.clear_now())
    }

    fn clear_now(&mut self) -> usize {
        let removed = self.list.clear();
        self.gate.reset();
        self.generation += 1;
        tracing::info!(context = %self.context(), removed, "Scan list cleared");
        removed
    }

    pub fn total_items(&self) -> u64 {
        self.list.total_items()
    }

    pub fn total_value(&self) -> BigDecimal {
        self.list.total_value()
    }

    pub fn product_count(&self) -> usize {
        self.list.product_count()
    }

    pub fn is_product_in_list(&self, barcode: &str) -> bool {
        self.list.is_product_in_list(barcode.trim())
    }

    pub fn product_quantity(&self, barcode: &str) -> u64 {
        self.list.product_quantity(barcode.trim())
    }

    pub fn summary(&self) -> ListSummary {
        ListSummary {
            total_items: self.total_items(),
            total_value: self.total_value(),
            product_count: self.product_count(),
            stats: self.stats,
        }
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// 清单版本号，每次变更递增
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn gate(&self) -> &ScanGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn aggregator(context: ScanContext) -> (ScanAggregator, ManualClock) {
        let clock = ManualClock::default();
        let agg = ScanAggregator::with_clock(context, &ScanConfig::default(), Arc::new(clock.clone()));
        (agg, clock)
    }

    fn priced(price: i32) -> ProductData {
        ProductData {
            product_id: Some("P-123".into()),
            product_name: Some("Espresso".into()),
            unit_price: Some(BigDecimal::from(price)),
            ..Default::default()
        }
    }

    #[test]
    fn rejected_scan_counts_and_leaves_list() {
        let (mut agg, _) = aggregator(ScanContext::Sales);
        let outcome = agg.scan_product("123", priced(0));
        assert!(matches!(
            outcome,
            ScanOutcome::Dropped {
                reason: DropReason::Rejected { .. }
            }
        ));
        assert_eq!(agg.product_count(), 0);
        assert_eq!(agg.stats().rejected, 1);
        assert_eq!(agg.generation(), 0);
    }

    #[test]
    fn rescan_after_window_merges_through_insert_path() {
        let (mut agg, clock) = aggregator(ScanContext::Sales);
        let first = agg.scan_product("123", priced(1000));
        clock.advance_ms(5000);
        let second = agg.scan_product("123", priced(1000));
        assert_eq!(
            second,
            ScanOutcome::Merged {
                id: first.item_id().unwrap(),
                quantity: 2
            }
        );
        assert_eq!(agg.stats().merged, 1);
    }

    #[test]
    fn rescan_of_saturated_line_is_dropped_not_merged() {
        let (mut agg, clock) = aggregator(ScanContext::Inventory);
        let id = agg.scan_product("123", ProductData::default()).item_id().unwrap();
        agg.update_quantity(id, i64::from(u32::MAX)).unwrap();
        let generation = agg.generation();

        clock.advance_ms(100);
        assert_eq!(
            agg.scan_product("123", ProductData::default()),
            ScanOutcome::Dropped {
                reason: DropReason::QuantityLimit { id }
            }
        );
        clock.advance_ms(5000);
        assert_eq!(
            agg.scan_product("123", ProductData::default()),
            ScanOutcome::Dropped {
                reason: DropReason::QuantityLimit { id }
            }
        );

        assert_eq!(agg.get_item(id).unwrap().quantity(), u32::MAX);
        assert_eq!(agg.stats().merged, 0);
        assert_eq!(agg.stats().at_limit, 2);
        assert_eq!(agg.generation(), generation);
    }

    #[test]
    fn notes_only_outside_sales() {
        let (mut sales, _) = aggregator(ScanContext::Sales);
        let id = sales.scan_product("1", priced(10)).item_id().unwrap();
        assert_eq!(
            sales.update_notes(id, Some("x".into())).unwrap_err(),
            ListError::NotesNotAllowed(ScanContext::Sales)
        );

        let (mut inventory, _) = aggregator(ScanContext::Inventory);
        let id = inventory.scan_product("1", ProductData::default()).item_id().unwrap();
        let item = inventory.update_notes(id, Some("shelf 4".into())).unwrap();
        assert_eq!(item.notes(), Some("shelf 4"));
    }

    #[test]
    fn stale_clear_request_is_refused() {
        let (mut agg, clock) = aggregator(ScanContext::Inventory);
        agg.scan_product("1", ProductData::default());

        let ClearOutcome::ConfirmationRequired(request) = agg.clear_list(false) else {
            panic!("non-silent clear must ask for confirmation");
        };
        assert_eq!(request.product_count, 1);
        assert_eq!(agg.product_count(), 1);

        clock.advance_ms(3000);
        agg.scan_product("2", ProductData::default());
        assert!(matches!(
            agg.confirm_clear(&request),
            Err(ListError::StaleClearRequest { .. })
        ));
        assert_eq!(agg.product_count(), 2);

        let fresh = agg.request_clear();
        assert_eq!(agg.confirm_clear(&fresh), Ok(2));
        assert_eq!(agg.product_count(), 0);
        assert!(agg.gate().window().is_empty());
    }

    #[test]
    fn aggregate_queries_trim_barcode() {
        let (mut agg, _) = aggregator(ScanContext::Inventory);
        agg.scan_product(" 777 ", ProductData::default());
        assert!(agg.is_product_in_list(" 777"));
        assert_eq!(agg.product_quantity("777 "), 1);
    }
}
