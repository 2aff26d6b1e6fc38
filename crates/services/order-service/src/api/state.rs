//! Application state - dependency injection container.

use std::sync::Arc;

use crate::infra::{Database, Persistence};
use crate::service::{IdentityResolver, IdentityService, OrderManager, OrderService};

/// Application state containing all services.
#[derive(Clone)]
pub struct AppState {
    pub order_service: Arc<dyn OrderService>,
    pub identity_service: Arc<dyn IdentityService>,
    /// Database handle, for health checks
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire services over a single unit of work on `database`.
    pub fn from_database(database: Arc<Database>) -> Self {
        let uow = Arc::new(Persistence::new(database.get_connection()));

        Self {
            order_service: Arc::new(OrderManager::new(uow.clone())),
            identity_service: Arc::new(IdentityResolver::new(uow)),
            database,
        }
    }
}
