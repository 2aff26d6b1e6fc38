//! HTTP request handlers.

pub mod health_handler;
pub mod order_handler;

pub use order_handler::order_routes;
