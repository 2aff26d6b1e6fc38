//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::api::handlers::{health_handler, order_handler};
use domain::{OrderAuditResponse, OrderResponse, OrderStatus, ReceiptResponse, UserRole};

/// OpenAPI documentation for the order backend
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kook Order Backend",
        version = "0.1.0",
        description = "Order lifecycle, review and settlement API for the game-boosting marketplace"
    ),
    paths(
        health_handler::root,
        health_handler::health,
        order_handler::create_order,
        order_handler::get_order,
        order_handler::review_order,
        order_handler::accept_order,
        order_handler::complete_order,
        order_handler::list_audits,
        order_handler::list_receipts,
    ),
    components(
        schemas(
            OrderStatus,
            UserRole,
            OrderResponse,
            OrderAuditResponse,
            ReceiptResponse,
            order_handler::CreateOrderRequest,
            order_handler::ReviewRequest,
            order_handler::AcceptRequest,
            order_handler::CompleteRequest,
            health_handler::RootResponse,
            health_handler::HealthResponse,
            health_handler::ServiceStatus,
        )
    ),
    tags(
        (name = "Orders", description = "Order lifecycle operations"),
        (name = "Health", description = "Liveness and dependency checks")
    )
)]
pub struct ApiDoc;
