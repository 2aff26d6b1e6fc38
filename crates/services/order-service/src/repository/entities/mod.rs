//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod external_binding;
pub mod order;
pub mod order_audit;
pub mod receipt;
pub mod user;

pub use external_binding::Entity as ExternalBindingEntity;
pub use order::Entity as OrderEntity;
pub use order_audit::Entity as OrderAuditEntity;
pub use receipt::Entity as ReceiptEntity;
pub use user::Entity as UserEntity;
