//! HTTP tests driving the router with `oneshot` over an in-memory database.

mod support;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use order_service_lib::api::create_router;

use support::setup_state;

async fn app() -> Router {
    create_router(setup_state().await)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn order_body() -> Value {
    json!({
        "game_name": "LOL",
        "amount_cents": 3000,
        "duration_hours": 1.5,
        "boss_kook_id": "B1",
        "boss_kook_name": "Boss"
    })
}

#[tokio::test]
async fn root_reports_service() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "Kook Order Backend");
}

#[tokio::test]
async fn health_pings_database() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "healthy");
}

#[tokio::test]
async fn create_returns_created_order() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/api/orders", Some(order_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PENDING_REVIEW");
    assert_eq!(body["duration_hours"], "1.50");
    assert_eq!(body["amount_cents"], 3000);
    assert_eq!(body["boss_kook_id"], "B1");
    assert_eq!(body["player_kook_id"], Value::Null);
    assert_eq!(body["extra"], json!({}));

    let id = body["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/orders/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id);
}

#[tokio::test]
async fn duration_accepts_string_input() {
    let app = app().await;
    let mut body = order_body();
    body["duration_hours"] = json!("2.5");

    let (status, created) = send(&app, "POST", "/api/orders", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["duration_hours"], "2.50");
}

#[tokio::test]
async fn missing_order_returns_404() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/api/orders/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, "GET", "/api/orders/999/receipts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn out_of_order_transition_returns_409() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/api/orders", Some(order_body())).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/orders/{}/accept", id),
        Some(json!({"player_kook_id": "P1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATE");
    assert_eq!(
        body["error"]["message"],
        "invalid state: PENDING_REVIEW. expect REVIEW_APPROVED"
    );
}

#[tokio::test]
async fn invalid_bodies_return_400() {
    let app = app().await;

    let mut negative = order_body();
    negative["amount_cents"] = json!(-1);
    let (status, body) = send(&app, "POST", "/api/orders", Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let mut precise = order_body();
    precise["duration_hours"] = json!(1.234);
    let (status, _) = send(&app, "POST", "/api/orders", Some(precise)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/orders",
        Some(json!({"game_name": "LOL"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut long_name = order_body();
    long_name["game_name"] = json!("x".repeat(101));
    let (status, _) = send(&app, "POST", "/api/orders", Some(long_name)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lifecycle_over_http() {
    let app = app().await;
    let (_, created) = send(&app, "POST", "/api/orders", Some(order_body())).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/orders/{}/review", id),
        Some(json!({"reviewer_kook_id": "R1", "approve": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REVIEW_APPROVED");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/orders/{}/accept", id),
        Some(json!({"player_kook_id": "P1", "player_kook_name": "Player One"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "IN_PROGRESS");
    assert_eq!(body["player_kook_name"], "Player One");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/orders/{}/complete", id),
        Some(json!({"actor_kook_id": "P1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");

    let (status, receipts) =
        send(&app, "GET", &format!("/api/orders/{}/receipts", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipts.as_array().map(Vec::len), Some(1));
    assert_eq!(receipts[0]["type"], "COMPLETION");
    assert_eq!(receipts[0]["payload"]["amount_cents"], 3000);

    let (status, audits) = send(&app, "GET", &format!("/api/orders/{}/audits", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audits.as_array().map(Vec::len), Some(4));
    assert_eq!(audits[2]["from_status"], "REVIEW_APPROVED");
    assert_eq!(audits[2]["to_status"], "IN_PROGRESS");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app().await;

    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/orders/{id}/complete"].is_object());
}
