pub mod context;
pub mod item;
pub mod scan_input;
pub mod session;
pub mod summary;

pub use context::ScanContext;
pub use item::{ItemId, SaleUnit, ScannedItem};
pub use scan_input::{NormalizedScan, ProductData, SalesScanInput, ScanInput, StockScanInput};
pub use session::SessionId;
pub use summary::{ClearOutcome, ClearRequest, ListSummary, ScanStats};
