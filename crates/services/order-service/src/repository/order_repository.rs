//! Read-only order queries outside of a transaction.
//!
//! Writes go through [`crate::infra::TransactionContext`] so that status
//! changes and their audit rows commit together.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::entities::{order_audit, receipt, OrderAuditEntity, OrderEntity, ReceiptEntity};
use common::{AppError, AppResult};
use domain::{Order, OrderAudit, Receipt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Find order by ID
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>>;

    /// Audit trail of an order, oldest first
    async fn list_audits(&self, order_id: i64) -> AppResult<Vec<OrderAudit>>;

    /// Receipts issued for an order, oldest first
    async fn list_receipts(&self, order_id: i64) -> AppResult<Vec<Receipt>>;
}

/// Concrete implementation of OrderRepository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>> {
        let result = OrderEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result
            .map(Order::try_from)
            .transpose()
            .map_err(AppError::from)
    }

    async fn list_audits(&self, order_id: i64) -> AppResult<Vec<OrderAudit>> {
        let models = OrderAuditEntity::find()
            .filter(order_audit::Column::OrderId.eq(order_id))
            .order_by_asc(order_audit::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models
            .into_iter()
            .map(|m| OrderAudit::try_from(m).map_err(AppError::from))
            .collect()
    }

    async fn list_receipts(&self, order_id: i64) -> AppResult<Vec<Receipt>> {
        let models = ReceiptEntity::find()
            .filter(receipt::Column::OrderId.eq(order_id))
            .order_by_asc(receipt::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models
            .into_iter()
            .map(|m| Receipt::try_from(m).map_err(AppError::from))
            .collect()
    }
}
