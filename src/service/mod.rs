pub mod aggregator;
pub mod debounce;
pub mod line_list;
pub mod sessions;
pub mod validator;

pub use aggregator::{DropReason, ScanAggregator, ScanOutcome};
pub use debounce::{DebounceWindow, GateDecision, InFlightLocks, ScanGate};
pub use line_list::{LineList, Placement};
pub use sessions::SessionRegistry;
pub use validator::{normalize_barcode, ContextPolicy, ContextValidator};
