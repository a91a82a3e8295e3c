use crate::models::{ItemId, ScanContext, SessionId};
use bigdecimal::BigDecimal;
use serde::Serialize;
use thiserror::Error;

/// 扫码被业务场景校验拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ScanRejection {
    #[error("Barcode is empty after trimming")]
    EmptyBarcode,

    #[error("Product id is required in {context} context")]
    MissingProductId { context: ScanContext },

    #[error("Product name is required in {context} context")]
    MissingProductName { context: ScanContext },

    #[error("Unit price must be greater than zero in {context} context")]
    NonPositivePrice { context: ScanContext },

    #[error("Unit price cannot be negative: {price}")]
    NegativePrice { price: BigDecimal },

    #[error("Starting quantity must be positive: {quantity}")]
    InvalidQuantity { quantity: i64 },

    #[error("Starting quantity is too large: {quantity}")]
    QuantityTooLarge { quantity: i64 },

    #[error("Scan for {actual} context sent to a {expected} session")]
    ContextMismatch {
        expected: ScanContext,
        actual: ScanContext,
    },
}

/// 清单变更失败 (状态保持不变)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Quantity must be greater than zero: {0}")]
    NonPositiveQuantity(i64),

    #[error("Quantity is too large: {0}")]
    QuantityTooLarge(i64),

    #[error("Item {0} is at the maximum quantity")]
    QuantityLimitReached(ItemId),

    #[error("Unit price cannot be negative: {0}")]
    NegativePrice(BigDecimal),

    #[error("Clear request is stale: requested at generation {requested}, list is at {current}")]
    StaleClearRequest { requested: u64, current: u64 },

    #[error("Notes are not recorded in {0} context")]
    NotesNotAllowed(ScanContext),
}

/// 会话表错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
}
