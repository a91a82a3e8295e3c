//! 防抖窗口与条码锁
//!
//! 按件商品的重复扫码先经过这里决定: 窗口内合并/丢弃，窗口外进入插入流程。
//! 称重商品不经过这里。

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// 配置的毫秒数转为时长，超出 i64 范围时取上限
fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

/// 每个条码最近一次被接受的扫码时间
#[derive(Debug, Clone)]
pub struct DebounceWindow {
    window: Duration,
    last_accepted: HashMap<String, DateTime<Utc>>,
}

impl DebounceWindow {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: millis(window_ms),
            last_accepted: HashMap::new(),
        }
    }

    /// 距上次接受的毫秒数，没有记录时返回 None (视为无穷大)
    pub fn elapsed_ms(&self, barcode: &str, now: DateTime<Utc>) -> Option<i64> {
        self.last_accepted
            .get(barcode)
            .map(|last| (now - *last).num_milliseconds())
    }

    /// 时钟回拨 (elapsed < 0) 也算在窗口内
    pub fn is_within(&self, barcode: &str, now: DateTime<Utc>) -> bool {
        self.elapsed_ms(barcode, now)
            .is_some_and(|elapsed| elapsed < self.window.num_milliseconds())
    }

    /// 记录一次接受，同时清理已出窗口的条码
    pub fn record(&mut self, barcode: &str, now: DateTime<Utc>) {
        self.prune(now);
        self.last_accepted.insert(barcode.to_string(), now);
    }

    pub fn prune(&mut self, now: DateTime<Utc>) {
        let window = self.window;
        self.last_accepted.retain(|_, last| now - *last < window);
    }

    pub fn len(&self) -> usize {
        self.last_accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_accepted.is_empty()
    }

    pub fn reset(&mut self) {
        self.last_accepted.clear();
    }
}

/// 插入中的条码锁，持有 `hold` 时长后自动释放
#[derive(Debug, Clone)]
pub struct InFlightLocks {
    hold: Duration,
    acquired: HashMap<String, DateTime<Utc>>,
}

impl InFlightLocks {
    pub fn new(hold_ms: u64) -> Self {
        Self {
            hold: millis(hold_ms),
            acquired: HashMap::new(),
        }
    }

    /// 尝试加锁，已被持有则返回 false
    pub fn try_acquire(&mut self, barcode: &str, now: DateTime<Utc>) -> bool {
        self.release_expired(now);
        if self.acquired.contains_key(barcode) {
            return false;
        }
        self.acquired.insert(barcode.to_string(), now);
        true
    }

    pub fn is_held(&self, barcode: &str, now: DateTime<Utc>) -> bool {
        self.acquired
            .get(barcode)
            .is_some_and(|at| now - *at < self.hold)
    }

    pub fn release(&mut self, barcode: &str) {
        self.acquired.remove(barcode);
    }

    pub fn release_expired(&mut self, now: DateTime<Utc>) {
        let hold = self.hold;
        self.acquired.retain(|_, at| now - *at < hold);
    }

    pub fn len(&self) -> usize {
        self.acquired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acquired.is_empty()
    }

    pub fn reset(&mut self) {
        self.acquired.clear();
    }
}

/// 按件商品扫码的闸门判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// 防抖窗口内: 有对应行则合并，没有则丢弃
    WithinWindow,
    /// 窗口外且已加锁: 进入插入或合并流程
    Proceed,
    /// 同一条码正在插入中
    InFlight,
}

/// 防抖窗口 + 条码锁
#[derive(Debug, Clone)]
pub struct ScanGate {
    window: DebounceWindow,
    locks: InFlightLocks,
}

impl ScanGate {
    pub fn new(debounce_ms: u64, lock_release_ms: u64) -> Self {
        Self {
            window: DebounceWindow::new(debounce_ms),
            locks: InFlightLocks::new(lock_release_ms),
        }
    }

    /// 判定一次按件扫码；返回 Proceed 时该条码已被加锁
    pub fn check(&mut self, barcode: &str, now: DateTime<Utc>) -> GateDecision {
        if self.window.is_within(barcode, now) {
            return GateDecision::WithinWindow;
        }
        if !self.locks.try_acquire(barcode, now) {
            return GateDecision::InFlight;
        }
        GateDecision::Proceed
    }

    /// 合并或插入成功后记录
    pub fn accept(&mut self, barcode: &str, now: DateTime<Utc>) {
        self.window.record(barcode, now);
    }

    pub fn window(&self) -> &DebounceWindow {
        &self.window
    }

    pub fn locks(&self) -> &InFlightLocks {
        &self.locks
    }

    pub fn reset(&mut self) {
        self.window.reset();
        self.locks.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn unknown_barcode_is_outside_window() {
        let window = DebounceWindow::new(2000);
        assert_eq!(window.elapsed_ms("123", at(0)), None);
        assert!(!window.is_within("123", at(0)));
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let mut window = DebounceWindow::new(2000);
        window.record("123", at(0));
        assert!(window.is_within("123", at(1999)));
        assert!(!window.is_within("123", at(2000)));
        assert!(!window.is_within("456", at(10)));
    }

    #[test]
    fn clock_moving_backwards_stays_within_window() {
        let mut window = DebounceWindow::new(2000);
        window.record("123", at(1000));
        assert_eq!(window.elapsed_ms("123", at(0)), Some(-1000));
        assert!(window.is_within("123", at(0)));
    }

    #[test]
    fn record_prunes_barcodes_outside_window() {
        let mut window = DebounceWindow::new(2000);
        window.record("111", at(0));
        window.record("222", at(1500));
        assert_eq!(window.len(), 2);

        window.record("333", at(3000));
        assert_eq!(window.len(), 2);
        assert_eq!(window.elapsed_ms("111", at(3000)), None);
        assert!(window.is_within("222", at(3000)));
    }

    #[test]
    fn oversized_durations_are_clamped() {
        let mut window = DebounceWindow::new(u64::MAX);
        window.record("123", at(0));
        assert!(window.is_within("123", at(1_000_000_000)));

        let mut locks = InFlightLocks::new(1 << 63);
        assert!(locks.try_acquire("123", at(0)));
        assert!(locks.is_held("123", at(1_000_000_000)));
    }

    #[test]
    fn lock_released_after_hold() {
        let mut locks = InFlightLocks::new(250);
        assert!(locks.try_acquire("123", at(0)));
        assert!(!locks.try_acquire("123", at(100)));
        assert!(locks.is_held("123", at(249)));
        assert!(!locks.is_held("123", at(250)));
        assert!(locks.try_acquire("123", at(250)));
    }

    #[test]
    fn explicit_release_frees_lock() {
        let mut locks = InFlightLocks::new(250);
        assert!(locks.try_acquire("123", at(0)));
        locks.release("123");
        assert!(locks.try_acquire("123", at(1)));
    }

    #[test]
    fn gate_checks_window_before_lock() {
        let mut gate = ScanGate::new(2000, 250);
        assert_eq!(gate.check("123", at(0)), GateDecision::Proceed);
        gate.accept("123", at(0));
        assert_eq!(gate.check("123", at(100)), GateDecision::WithinWindow);
        assert_eq!(gate.check("123", at(2500)), GateDecision::Proceed);
    }

    #[test]
    fn gate_without_window_relies_on_lock() {
        let mut gate = ScanGate::new(0, 250);
        assert_eq!(gate.check("123", at(0)), GateDecision::Proceed);
        gate.accept("123", at(0));
        assert_eq!(gate.check("123", at(0)), GateDecision::InFlight);
        assert_eq!(gate.check("123", at(300)), GateDecision::Proceed);
    }

    #[test]
    fn reset_clears_both_maps() {
        let mut gate = ScanGate::new(2000, 250);
        gate.check("123", at(0));
        gate.accept("123", at(0));
        gate.reset();
        assert!(gate.window().is_empty());
        assert!(gate.locks().is_empty());
        assert_eq!(gate.check("123", at(1)), GateDecision::Proceed);
    }
}
