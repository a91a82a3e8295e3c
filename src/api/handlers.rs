use crate::error::{ListError, SessionError};
use crate::models::{
    ClearOutcome, ItemId, ListSummary, ProductData, ScanContext, ScannedItem, SessionId,
};
use crate::service::{ScanOutcome, SessionRegistry};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 开启会话
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub context: ScanContext,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenSessionResponse {
    pub session_id: SessionId,
    pub context: ScanContext,
}

/// 请求体: 一次扫码 (条码 + 商品查询结果)
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub barcode: String,
    #[serde(default)]
    pub product: ProductData,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub accepted: bool,
    pub outcome: ScanOutcome,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<ScannedItem>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub success: bool,
    pub item: ScannedItem,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePriceRequest {
    pub unit_price: BigDecimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClearListRequest {
    #[serde(default)]
    pub silent: bool,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmClearRequest {
    pub generation: u64,
}

#[derive(Debug, Serialize)]
pub struct ProductPresence {
    pub barcode: String,
    pub in_list: bool,
    pub quantity: u64,
}

/// 通用响应体
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

fn message(status: StatusCode, success: bool, message: String) -> Response {
    (status, Json(MessageResponse { success, message })).into_response()
}

fn session_error(e: SessionError) -> Response {
    message(StatusCode::NOT_FOUND, false, format!("Error: {}", e))
}

fn list_error(e: ListError) -> Response {
    let status = match e {
        ListError::ItemNotFound(_) => StatusCode::NOT_FOUND,
        ListError::StaleClearRequest { .. } | ListError::QuantityLimitReached(_) => StatusCode::CONFLICT,
        ListError::NonPositiveQuantity(_)
        | ListError::QuantityTooLarge(_)
        | ListError::NegativePrice(_)
        | ListError::NotesNotAllowed(_) => StatusCode::BAD_REQUEST,
    };
    message(status, false, format!("Error: {}", e))
}

fn item_result(result: Result<Result<ScannedItem, ListError>, SessionError>) -> Response {
    match result {
        Ok(Ok(item)) => (StatusCode::OK, Json(ItemResponse { success: true, item })).into_response(),
        Ok(Err(e)) => list_error(e),
        Err(e) => session_error(e),
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 开启扫码会话
pub async fn open_session(
    State(registry): State<Arc<SessionRegistry>>,
    Json(req): Json<OpenSessionRequest>,
) -> Response {
    let session_id = registry.open(req.context);
    let response = OpenSessionResponse {
        session_id,
        context: req.context,
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

/// 结束扫码会话
pub async fn close_session(
    State(registry): State<Arc<SessionRegistry>>,
    Path(session_id): Path<SessionId>,
) -> Response {
    match registry.close(session_id) {
        Ok(()) => message(StatusCode::OK, true, format!("Session {} closed", session_id)),
        Err(e) => session_error(e),
    }
}

/// 扫码 (被丢弃的扫码同样返回 200，由 accepted 区分)
pub async fn scan(
    State(registry): State<Arc<SessionRegistry>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<ScanRequest>,
) -> Response {
    match registry.with_session(session_id, |s| s.scan_product(&req.barcode, req.product)) {
        Ok(outcome) => {
            let response = ScanResponse {
                accepted: outcome.is_accepted(),
                outcome,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => session_error(e),
    }
}

/// 当前清单
pub async fn list_items(
    State(registry): State<Arc<SessionRegistry>>,
    Path(session_id): Path<SessionId>,
) -> Response {
    match registry.with_session(session_id, |s| s.items()) {
        Ok(items) => (StatusCode::OK, Json(ItemsResponse { items })).into_response(),
        Err(e) => session_error(e),
    }
}

pub async fn update_quantity(
    State(registry): State<Arc<SessionRegistry>>,
    Path((session_id, item_id)): Path<(SessionId, ItemId)>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Response {
    item_result(registry.with_session(session_id, |s| {
        s.update_quantity(item_id, req.quantity).cloned()
    }))
}

pub async fn update_price(
    State(registry): State<Arc<SessionRegistry>>,
    Path((session_id, item_id)): Path<(SessionId, ItemId)>,
    Json(req): Json<UpdatePriceRequest>,
) -> Response {
    item_result(registry.with_session(session_id, |s| {
        s.update_unit_price(item_id, req.unit_price).cloned()
    }))
}

pub async fn update_notes(
    State(registry): State<Arc<SessionRegistry>>,
    Path((session_id, item_id)): Path<(SessionId, ItemId)>,
    Json(req): Json<UpdateNotesRequest>,
) -> Response {
    item_result(registry.with_session(session_id, |s| {
        s.update_notes(item_id, req.notes).cloned()
    }))
}

/// 删除一行 (不存在也返回成功)
pub async fn remove_item(
    State(registry): State<Arc<SessionRegistry>>,
    Path((session_id, item_id)): Path<(SessionId, ItemId)>,
) -> Response {
    match registry.with_session(session_id, |s| s.remove_item(item_id)) {
        Ok(removed) => {
            let text = if removed.is_some() {
                format!("Item {} removed", item_id)
            } else {
                format!("Item {} not in list", item_id)
            };
            message(StatusCode::OK, true, text)
        }
        Err(e) => session_error(e),
    }
}

/// 清空清单: silent=false 时返回待确认请求 (202)
pub async fn clear_list(
    State(registry): State<Arc<SessionRegistry>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<ClearListRequest>,
) -> Response {
    match registry.with_session(session_id, |s| s.clear_list(req.silent)) {
        Ok(outcome @ ClearOutcome::Cleared { .. }) => (StatusCode::OK, Json(outcome)).into_response(),
        Ok(outcome @ ClearOutcome::ConfirmationRequired(_)) => {
            (StatusCode::ACCEPTED, Json(outcome)).into_response()
        }
        Err(e) => session_error(e),
    }
}

pub async fn confirm_clear(
    State(registry): State<Arc<SessionRegistry>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<ConfirmClearRequest>,
) -> Response {
    match registry.with_session(session_id, |s| s.confirm_clear_generation(req.generation)) {
        Ok(Ok(removed)) => (StatusCode::OK, Json(ClearOutcome::Cleared { removed })).into_response(),
        Ok(Err(e)) => list_error(e),
        Err(e) => session_error(e),
    }
}

/// 汇总: 数量合计、金额合计、行数、扫码计数
pub async fn summary(
    State(registry): State<Arc<SessionRegistry>>,
    Path(session_id): Path<SessionId>,
) -> Response {
    match registry.with_session(session_id, |s| s.summary()) {
        Ok(summary) => (StatusCode::OK, Json::<ListSummary>(summary)).into_response(),
        Err(e) => session_error(e),
    }
}

pub async fn product_presence(
    State(registry): State<Arc<SessionRegistry>>,
    Path((session_id, barcode)): Path<(SessionId, String)>,
) -> Response {
    match registry.with_session(session_id, |s| {
        (s.is_product_in_list(&barcode), s.product_quantity(&barcode))
    }) {
        Ok((in_list, quantity)) => {
            let response = ProductPresence {
                barcode,
                in_list,
                quantity,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => session_error(e),
    }
}
