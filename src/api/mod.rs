pub mod handlers;

pub use handlers::*;

use crate::service::SessionRegistry;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 构建路由
pub fn router(registry: Arc<SessionRegistry>) -> Router {
    let session_routes = Router::new()
        .route("/api/sessions", post(handlers::open_session))
        .route(
            "/api/sessions/:session_id",
            delete(handlers::close_session),
        )
        .route("/api/sessions/:session_id/scans", post(handlers::scan))
        .route("/api/sessions/:session_id/items", get(handlers::list_items))
        .route(
            "/api/sessions/:session_id/items/:item_id",
            delete(handlers::remove_item),
        )
        .route(
            "/api/sessions/:session_id/items/:item_id/quantity",
            put(handlers::update_quantity),
        )
        .route(
            "/api/sessions/:session_id/items/:item_id/price",
            put(handlers::update_price),
        )
        .route(
            "/api/sessions/:session_id/items/:item_id/notes",
            put(handlers::update_notes),
        )
        .route("/api/sessions/:session_id/clear", post(handlers::clear_list))
        .route(
            "/api/sessions/:session_id/clear/confirm",
            post(handlers::confirm_clear),
        )
        .route("/api/sessions/:session_id/summary", get(handlers::summary))
        .route(
            "/api/sessions/:session_id/products/:barcode",
            get(handlers::product_presence),
        )
        .with_state(registry);

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(session_routes)
        .layer(ServiceBuilder::new())
}
