//! Order lifecycle handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use common::AppResult;
use domain::{
    AcceptOrder, CompleteOrder, CreateOrder, OrderAuditResponse, OrderResponse, ReceiptResponse,
    ReviewOrder,
};

/// Order creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    /// Game or task description
    #[validate(length(min = 1, max = 100, message = "game_name must be 1-100 characters"))]
    #[schema(example = "LOL")]
    pub game_name: String,
    /// Price in minor currency units
    #[validate(range(min = 0, message = "amount_cents must be >= 0"))]
    #[schema(example = 3000)]
    pub amount_cents: i64,
    /// Hours, at most two decimal places
    #[schema(value_type = f64, example = 1.5)]
    pub duration_hours: Decimal,
    #[validate(length(min = 1, message = "boss_kook_id is required"))]
    #[schema(example = "B1")]
    pub boss_kook_id: String,
    #[validate(length(min = 1, max = 100, message = "boss_kook_name must be 1-100 characters"))]
    #[schema(example = "Boss")]
    pub boss_kook_name: String,
}

impl From<CreateOrderRequest> for CreateOrder {
    fn from(req: CreateOrderRequest) -> Self {
        Self {
            game_name: req.game_name,
            amount_cents: req.amount_cents,
            duration_hours: req.duration_hours,
            boss_kook_id: req.boss_kook_id,
            boss_kook_name: req.boss_kook_name,
        }
    }
}

/// Review decision request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    #[validate(length(min = 1, message = "reviewer_kook_id is required"))]
    #[schema(example = "R1")]
    pub reviewer_kook_id: String,
    pub approve: bool,
    /// Defaults to `approved` or `rejected`
    pub reason: Option<String>,
}

impl From<ReviewRequest> for ReviewOrder {
    fn from(req: ReviewRequest) -> Self {
        Self {
            reviewer_kook_id: req.reviewer_kook_id,
            approve: req.approve,
            reason: req.reason,
        }
    }
}

/// Accept request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AcceptRequest {
    #[validate(length(min = 1, message = "player_kook_id is required"))]
    #[schema(example = "P1")]
    pub player_kook_id: String,
    /// Keeps the current player name when omitted
    #[validate(length(min = 1, max = 100, message = "player_kook_name must be 1-100 characters"))]
    pub player_kook_name: Option<String>,
    #[schema(value_type = Object, nullable)]
    pub payload: Option<Value>,
}

impl From<AcceptRequest> for AcceptOrder {
    fn from(req: AcceptRequest) -> Self {
        Self {
            player_kook_id: req.player_kook_id,
            player_kook_name: req.player_kook_name,
            payload: req.payload,
        }
    }
}

/// Completion request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompleteRequest {
    #[validate(length(min = 1, message = "actor_kook_id is required"))]
    #[schema(example = "P1")]
    pub actor_kook_id: String,
    /// Receipt payload; a snapshot of the order is stored when omitted
    #[schema(value_type = Object, nullable)]
    pub payload: Option<Value>,
}

impl From<CompleteRequest> for CompleteOrder {
    fn from(req: CompleteRequest) -> Self {
        Self {
            actor_kook_id: req.actor_kook_id,
            payload: req.payload,
        }
    }
}

/// Create order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/review", post(review_order))
        .route("/:id/accept", post(accept_order))
        .route("/:id/complete", post(complete_order))
        .route("/:id/audits", get(list_audits))
        .route("/:id/receipts", get(list_receipts))
}

/// Create a new order
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created in PENDING_REVIEW", body = OrderResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Duplicate or invalid data")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    let order = state.order_service.create_order(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// Get order by ID
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderResponse>> {
    let order = state.order_service.get_order(id).await?;

    Ok(Json(OrderResponse::from(order)))
}

/// Approve or reject a pending order
#[utoipa::path(
    post,
    path = "/api/orders/{id}/review",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Order reviewed", body = OrderResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not PENDING_REVIEW")
    )
)]
pub async fn review_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<ReviewRequest>,
) -> AppResult<Json<OrderResponse>> {
    let order = state.order_service.review_order(id, payload.into()).await?;

    Ok(Json(OrderResponse::from(order)))
}

/// Accept an approved order as a player
#[utoipa::path(
    post,
    path = "/api/orders/{id}/accept",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = AcceptRequest,
    responses(
        (status = 200, description = "Order accepted", body = OrderResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not REVIEW_APPROVED")
    )
)]
pub async fn accept_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<AcceptRequest>,
) -> AppResult<Json<OrderResponse>> {
    let order = state.order_service.accept_order(id, payload.into()).await?;

    Ok(Json(OrderResponse::from(order)))
}

/// Complete an in-progress order
#[utoipa::path(
    post,
    path = "/api/orders/{id}/complete",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Order completed, receipt issued", body = OrderResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not IN_PROGRESS")
    )
)]
pub async fn complete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CompleteRequest>,
) -> AppResult<Json<OrderResponse>> {
    let order = state.order_service.complete_order(id, payload.into()).await?;

    Ok(Json(OrderResponse::from(order)))
}

/// List the audit trail of an order
#[utoipa::path(
    get,
    path = "/api/orders/{id}/audits",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Audit rows, oldest first", body = [OrderAuditResponse]),
        (status = 404, description = "Order not found")
    )
)]
pub async fn list_audits(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<OrderAuditResponse>>> {
    let audits = state.order_service.order_audits(id).await?;

    Ok(Json(audits.into_iter().map(OrderAuditResponse::from).collect()))
}

/// List the receipts of an order
#[utoipa::path(
    get,
    path = "/api/orders/{id}/receipts",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Receipts, oldest first", body = [ReceiptResponse]),
        (status = 404, description = "Order not found")
    )
)]
pub async fn list_receipts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<ReceiptResponse>>> {
    let receipts = state.order_service.order_receipts(id).await?;

    Ok(Json(receipts.into_iter().map(ReceiptResponse::from).collect()))
}
