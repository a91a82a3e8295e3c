pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{AppConfig, ScanConfig};
pub use error::{ListError, ScanRejection, SessionError};
pub use service::{ScanAggregator, ScanOutcome, SessionRegistry};
