use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use stock_scan_rust::{api, ManualClock, ScanConfig, SessionRegistry};
use tower::ServiceExt;

fn app() -> (Router, ManualClock) {
    let clock = ManualClock::default();
    let registry = SessionRegistry::with_clock(ScanConfig::default(), Arc::new(clock.clone()));
    (api::router(Arc::new(registry)), clock)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn open(app: &Router, context: &str) -> String {
    let (status, body) = call(app, "POST", "/api/sessions", Some(json!({ "context": context }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_responds() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn sales_scan_merge_and_summary() {
    let (app, clock) = app();
    let session = open(&app, "sales").await;
    let scan = json!({
        "barcode": "123",
        "product": { "product_id": "P-1", "product_name": "Baguette", "unit_price": "1000" }
    });

    let (status, body) = call(&app, "POST", &format!("/api/sessions/{}/scans", session), Some(scan.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["outcome"]["status"], "inserted");

    clock.advance_ms(200);
    let (_, body) = call(&app, "POST", &format!("/api/sessions/{}/scans", session), Some(scan)).await;
    assert_eq!(body["outcome"]["status"], "merged");
    assert_eq!(body["outcome"]["quantity"], 2);

    let (status, body) = call(&app, "GET", &format!("/api/sessions/{}/items", session), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);

    let (_, body) = call(&app, "GET", &format!("/api/sessions/{}/summary", session), None).await;
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["product_count"], 1);
    assert_eq!(body["stats"]["merged"], 1);

    let (_, body) = call(&app, "GET", &format!("/api/sessions/{}/products/123", session), None).await;
    assert_eq!(body["in_list"], true);
    assert_eq!(body["quantity"], 2);
}

#[tokio::test]
async fn rejected_scan_is_reported_not_failed() {
    let (app, _) = app();
    let session = open(&app, "sales").await;
    let scan = json!({ "barcode": "123", "product": { "product_id": "P-1", "product_name": "Free", "unit_price": "0" } });

    let (status, body) = call(&app, "POST", &format!("/api/sessions/{}/scans", session), Some(scan)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], false);
    assert_eq!(body["outcome"]["status"], "dropped");
    assert_eq!(body["outcome"]["reason"]["kind"], "rejected");
    assert_eq!(body["outcome"]["reason"]["rejection"]["code"], "non_positive_price");
}

#[tokio::test]
async fn item_updates_and_errors() {
    let (app, _) = app();
    let session = open(&app, "inventory").await;
    let (_, body) = call(&app, "POST", &format!("/api/sessions/{}/scans", session), Some(json!({ "barcode": "42" }))).await;
    let item_id = body["outcome"]["id"].as_str().unwrap().to_string();
    let item_uri = format!("/api/sessions/{}/items/{}", session, item_id);

    let (status, _) = call(&app, "PUT", &format!("{}/quantity", item_uri), Some(json!({ "quantity": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, "PUT", &format!("{}/quantity", item_uri), Some(json!({ "quantity": 5_000_000_000_i64 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("too large"));

    let (status, body) = call(&app, "PUT", &format!("{}/quantity", item_uri), Some(json!({ "quantity": 5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["quantity"], 5);

    let (status, _) = call(&app, "PUT", &format!("{}/price", item_uri), Some(json!({ "unit_price": "-1" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "PUT", &format!("{}/price", item_uri), Some(json!({ "unit_price": "2.5" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, "PUT", &format!("{}/notes", item_uri), Some(json!({ "notes": "aisle 3" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["notes"], "aisle 3");

    let (status, _) = call(&app, "DELETE", &item_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    // 再次删除: 空操作
    let (status, body) = call(&app, "DELETE", &item_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(&app, "PUT", &format!("{}/quantity", item_uri), Some(json!({ "quantity": 2 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clear_with_confirmation() {
    let (app, clock) = app();
    let session = open(&app, "reception").await;
    for barcode in ["1", "2"] {
        call(&app, "POST", &format!("/api/sessions/{}/scans", session), Some(json!({ "barcode": barcode }))).await;
        clock.advance_ms(10);
    }

    let clear_uri = format!("/api/sessions/{}/clear", session);
    let (status, body) = call(&app, "POST", &clear_uri, Some(json!({ "silent": false }))).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "confirmation_required");
    assert_eq!(body["product_count"], 2);
    let generation = body["generation"].as_u64().unwrap();

    let (status, _) = call(&app, "POST", &format!("{}/confirm", clear_uri), Some(json!({ "generation": generation + 1 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, "POST", &format!("{}/confirm", clear_uri), Some(json!({ "generation": generation }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    call(&app, "POST", &format!("/api/sessions/{}/scans", session), Some(json!({ "barcode": "3" }))).await;
    let (status, body) = call(&app, "POST", &clear_uri, Some(json!({ "silent": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cleared");
    assert_eq!(body["removed"], 1);
}

#[tokio::test]
async fn unknown_and_closed_sessions() {
    let (app, _) = app();
    let missing = "00000000-0000-0000-0000-000000000000";
    let (status, _) = call(&app, "GET", &format!("/api/sessions/{}/items", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let session = open(&app, "transfer").await;
    let (status, _) = call(&app, "DELETE", &format!("/api/sessions/{}", session), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "GET", &format!("/api/sessions/{}/summary", session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
