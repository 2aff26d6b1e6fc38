//! Unit of Work pattern implementation.
//!
//! Every lifecycle operation runs inside one transaction: the status change,
//! any identity upsert, the audit row and the receipt commit or roll back
//! together. Status preconditions are enforced with a compare-and-set update
//! so two racing transitions on the same order cannot both succeed.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend,
    DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel, NotSet, QueryFilter,
    Set, TransactionTrait,
};
use serde_json::Value;

use crate::repository::entities::{
    external_binding, order, order_audit, receipt, user, ExternalBindingEntity, OrderEntity,
    UserEntity,
};
use crate::repository::{OrderRepository, OrderStore};
use common::error::is_unique_violation;
use common::{AppError, AppResult, OptionExt};
use domain::{
    Assignee, DomainError, NewAudit, NewOrder, Order, OrderAudit, OrderStatus, Receipt,
    ReceiptType, User, UserRole,
};

/// Boxed future returned by transaction closures
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic transaction method; mock the
/// read repository instead, or run against an in-memory database.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Read-only order queries outside of a transaction
    fn orders(&self) -> Arc<dyn OrderRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn orders(&self) -> TxOrderRepository<'a> {
        TxOrderRepository { txn: self.txn }
    }

    /// Audit trail and receipt recorder
    pub fn audits(&self) -> TxAuditRepository<'a> {
        TxAuditRepository { txn: self.txn }
    }

    pub fn identities(&self) -> TxIdentityRepository<'a> {
        TxIdentityRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    order_repo: Arc<OrderStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        let order_repo = Arc::new(OrderStore::new(db.clone()));
        Self { db, order_repo }
    }

    async fn begin_transaction(&self) -> AppResult<DatabaseTransaction> {
        let txn = match self.db.get_database_backend() {
            // SQLite has no per-transaction isolation level
            DatabaseBackend::Sqlite => self.db.begin().await,
            _ => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::ReadCommitted),
                        Some(AccessMode::ReadWrite),
                    )
                    .await
            }
        };
        txn.map_err(AppError::from)
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self.begin_transaction().await?;
        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware order repository.
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Order>> {
        let result = OrderEntity::find_by_id(id)
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        result
            .map(Order::try_from)
            .transpose()
            .map_err(AppError::from)
    }

    /// Insert a new order in `PENDING_REVIEW` with an empty `extra` object.
    pub async fn insert(&self, new_order: &NewOrder) -> AppResult<Order> {
        let now = Utc::now();
        let active_model = order::ActiveModel {
            id: NotSet,
            game_name: Set(new_order.game_name.clone()),
            amount_cents: Set(new_order.amount_cents),
            duration_hours: Set(new_order.duration_hours),
            status: Set(OrderStatus::PendingReview.as_str().to_string()),
            boss_kook_id: Set(new_order.boss_kook_id.clone()),
            boss_kook_name: Set(new_order.boss_kook_name.clone()),
            player_kook_id: Set(None),
            player_kook_name: Set(None),
            extra: Set(Value::Object(Default::default())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(self.txn)
            .await
            .map_err(AppError::from)?;

        Order::try_from(model).map_err(AppError::from)
    }

    /// Move an order from `expected` to `next` if and only if it is still in
    /// `expected`. Returns `false` when no row matched.
    ///
    /// An assignee writes the player id, and the player name only when given.
    pub async fn compare_and_set_status(
        &self,
        id: i64,
        expected: OrderStatus,
        next: OrderStatus,
        assignee: Option<&Assignee>,
    ) -> AppResult<bool> {
        let mut update = OrderEntity::update_many()
            .col_expr(order::Column::Status, Expr::value(next.as_str()))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(assignee) = assignee {
            update = update.col_expr(
                order::Column::PlayerKookId,
                Expr::value(assignee.kook_id.clone()),
            );
            if let Some(name) = &assignee.kook_name {
                update = update.col_expr(order::Column::PlayerKookName, Expr::value(name.clone()));
            }
        }

        let result = update
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::Status.eq(expected.as_str()))
            .exec(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected == 1)
    }

    /// Persist `order.status -> next` for an order loaded earlier in this
    /// transaction. Fails with the order's current status when another
    /// transaction moved it in between.
    pub async fn advance(
        &self,
        order: &Order,
        next: OrderStatus,
        assignee: Option<&Assignee>,
    ) -> AppResult<()> {
        if self
            .compare_and_set_status(order.id, order.status, next, assignee)
            .await?
        {
            return Ok(());
        }

        let current = self
            .find_by_id(order.id)
            .await?
            .ok_or_not_found(format!("order {}", order.id))?
            .status;
        tracing::warn!(order_id = order.id, %current, expected = %order.status, "Concurrent status change");
        Err(DomainError::invalid_state(current, order.status).into())
    }
}

/// Transaction-aware audit and receipt recorder.
pub struct TxAuditRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAuditRepository<'a> {
    /// Append an audit row. Audit rows are never updated.
    pub async fn record(&self, audit: NewAudit) -> AppResult<OrderAudit> {
        let active_model = order_audit::ActiveModel {
            id: NotSet,
            order_id: Set(audit.order_id),
            actor_user_id: Set(audit.actor_user_id),
            from_status: Set(audit.from_status.map(|s| s.as_str().to_string())),
            to_status: Set(audit.to_status.as_str().to_string()),
            reason: Set(Some(audit.reason)),
            payload: Set(audit.payload),
            created_at: Set(Utc::now()),
        };

        let model = active_model
            .insert(self.txn)
            .await
            .map_err(AppError::from)?;

        OrderAudit::try_from(model).map_err(AppError::from)
    }

    pub async fn record_receipt(
        &self,
        order_id: i64,
        receipt_type: ReceiptType,
        payload: Value,
    ) -> AppResult<Receipt> {
        let active_model = receipt::ActiveModel {
            id: NotSet,
            order_id: Set(order_id),
            receipt_type: Set(receipt_type.as_str().to_string()),
            payload: Set(payload),
            created_at: Set(Utc::now()),
        };

        let model = active_model
            .insert(self.txn)
            .await
            .map_err(AppError::from)?;

        Receipt::try_from(model).map_err(AppError::from)
    }
}

/// Transaction-aware user and external binding repository.
pub struct TxIdentityRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxIdentityRepository<'a> {
    /// Find the user bound to an external account id
    pub async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<User>> {
        let result = ExternalBindingEntity::find()
            .filter(external_binding::Column::ExternalId.eq(external_id))
            .find_also_related(UserEntity)
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        match result {
            None => Ok(None),
            Some((_, Some(user))) => Ok(Some(User::from(user))),
            Some((binding, None)) => Err(AppError::internal(format!(
                "external binding {} has no user",
                binding.id
            ))),
        }
    }

    /// Insert a user together with its binding inside a savepoint.
    ///
    /// Returns `None` when another transaction bound `external_id` first; the
    /// savepoint is rolled back so the outer transaction stays usable.
    pub async fn insert_with_binding(
        &self,
        external_id: &str,
        display_name: &str,
        role: UserRole,
    ) -> AppResult<Option<User>> {
        let savepoint = self.txn.begin().await.map_err(AppError::from)?;
        let now = Utc::now();

        let inserted = async {
            let user = user::ActiveModel {
                id: NotSet,
                display_name: Set(display_name.to_string()),
                role: Set(role.as_str().to_string()),
                created_at: Set(now),
            }
            .insert(&savepoint)
            .await?;

            external_binding::ActiveModel {
                id: NotSet,
                user_id: Set(user.id),
                external_id: Set(external_id.to_string()),
                created_at: Set(now),
            }
            .insert(&savepoint)
            .await?;

            Ok::<_, sea_orm::DbErr>(user)
        }
        .await;

        match inserted {
            Ok(user) => {
                savepoint.commit().await.map_err(AppError::from)?;
                Ok(Some(User::from(user)))
            }
            Err(err) if is_unique_violation(&err) => {
                savepoint.rollback().await.map_err(AppError::from)?;
                Ok(None)
            }
            Err(err) => {
                if let Err(rollback_err) = savepoint.rollback().await {
                    tracing::error!("Savepoint rollback failed: {}", rollback_err);
                }
                Err(AppError::from(err))
            }
        }
    }
}

/// Run a block inside a transaction, binding the context to `$ctx`.
///
/// The block must only capture owned values.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(move |$ctx| Box::pin(async move { $body })).await
    };
}
