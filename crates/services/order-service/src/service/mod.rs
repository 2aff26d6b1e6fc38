//! Service layer - business use cases over the unit of work.

mod identity_resolver;
mod order_service;

pub use identity_resolver::{resolve_identity, IdentityResolver, IdentityService};
pub use order_service::{OrderManager, OrderService};
