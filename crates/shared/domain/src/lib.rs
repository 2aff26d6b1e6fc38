//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the order lifecycle state machine, identities, and the audit/receipt trail.

pub mod audit;
pub mod constants;
pub mod error;
pub mod order;
pub mod user;

pub use audit::{
    CompletionSnapshot, NewAudit, OrderAudit, OrderAuditResponse, Receipt, ReceiptResponse,
    ReceiptType,
};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use order::{
    check_length, non_empty_payload, normalize_duration, require_identity, transition, AcceptOrder, Assignee,
    CompleteOrder, CreateOrder, LifecycleOp, NewOrder, Order, OrderResponse, OrderStatus,
    ReviewOrder,
};
pub use user::{generated_display_name, User, UserRole};
