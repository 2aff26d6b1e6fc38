//! Order service - creation, review, acceptance and completion of orders.
//!
//! Each mutating operation runs in a single transaction. The precondition is
//! checked against the loaded order first, then enforced again by a
//! compare-and-set update so that a concurrent transition on the same order
//! surfaces as an invalid-state error instead of a double write.

use std::sync::Arc;

use async_trait::async_trait;

use common::{AppResult, OptionExt};
use domain::{
    non_empty_payload, require_identity, AcceptOrder, CompleteOrder, CompletionSnapshot,
    CreateOrder, LifecycleOp, NewAudit, NewOrder, Order, OrderAudit, OrderStatus, Receipt,
    ReceiptType, ReviewOrder, REASON_ACCEPT, REASON_COMPLETED, REASON_CREATE, ROLE_PLAYER,
    ROLE_REVIEWER,
};

use crate::infra::{TransactionContext, UnitOfWork};
use crate::service::resolve_identity;
use crate::with_transaction;

/// Order service trait for dependency injection.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Create an order in `PENDING_REVIEW` and record its creation audit
    async fn create_order(&self, input: CreateOrder) -> AppResult<Order>;

    /// Get order by ID
    async fn get_order(&self, id: i64) -> AppResult<Order>;

    /// Approve or reject a pending order
    async fn review_order(&self, id: i64, input: ReviewOrder) -> AppResult<Order>;

    /// Assign an approved order to a player
    async fn accept_order(&self, id: i64, input: AcceptOrder) -> AppResult<Order>;

    /// Complete an in-progress order and issue its completion receipt
    async fn complete_order(&self, id: i64, input: CompleteOrder) -> AppResult<Order>;

    /// Audit trail of an existing order
    async fn order_audits(&self, id: i64) -> AppResult<Vec<OrderAudit>>;

    /// Receipts of an existing order
    async fn order_receipts(&self, id: i64) -> AppResult<Vec<Receipt>>;
}

/// Concrete implementation of OrderService
pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn existing_order(&self, id: i64) -> AppResult<Order> {
        self.uow
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_not_found(order_label(id))
    }
}

fn order_label(id: i64) -> String {
    format!("order {}", id)
}

/// Load an order inside the transaction
async fn load_order(ctx: &TransactionContext<'_>, id: i64) -> AppResult<Order> {
    ctx.orders()
        .find_by_id(id)
        .await?
        .ok_or_not_found(order_label(id))
}

#[async_trait]
impl<U: UnitOfWork + 'static> OrderService for OrderManager<U> {
    async fn create_order(&self, input: CreateOrder) -> AppResult<Order> {
        let new_order = NewOrder::try_from(input)?;

        let order = with_transaction!(self.uow, |ctx| {
            let order = ctx.orders().insert(&new_order).await?;
            ctx.audits()
                .record(NewAudit {
                    order_id: order.id,
                    actor_user_id: None,
                    from_status: None,
                    to_status: OrderStatus::PendingReview,
                    reason: REASON_CREATE.to_string(),
                    payload: None,
                })
                .await?;
            Ok(order)
        })?;

        tracing::info!(order_id = order.id, boss = %order.boss_kook_id, "Order created");
        Ok(order)
    }

    async fn get_order(&self, id: i64) -> AppResult<Order> {
        self.existing_order(id).await
    }

    async fn review_order(&self, id: i64, input: ReviewOrder) -> AppResult<Order> {
        require_identity("reviewer_kook_id", &input.reviewer_kook_id)?;
        let op = LifecycleOp::Review {
            approve: input.approve,
        };

        let (order, from) = with_transaction!(self.uow, |ctx| {
            let order = load_order(&ctx, id).await?;
            let next = order.status.apply(op)?;
            let reviewer =
                resolve_identity(&ctx, &input.reviewer_kook_id, Some(ROLE_REVIEWER)).await?;

            ctx.orders().advance(&order, next, None).await?;
            ctx.audits()
                .record(NewAudit {
                    order_id: order.id,
                    actor_user_id: Some(reviewer.id),
                    from_status: Some(order.status),
                    to_status: next,
                    reason: input.audit_reason(),
                    payload: None,
                })
                .await?;

            Ok((load_order(&ctx, id).await?, order.status))
        })?;

        tracing::info!(order_id = id, from = %from, to = %order.status, "Order reviewed");
        Ok(order)
    }

    async fn accept_order(&self, id: i64, input: AcceptOrder) -> AppResult<Order> {
        input.validate()?;
        let assignee = input.assignee();
        let player = assignee.kook_id.clone();
        let payload = non_empty_payload(input.payload);

        let order = with_transaction!(self.uow, |ctx| {
            let order = load_order(&ctx, id).await?;
            let next = order.status.apply(LifecycleOp::Accept)?;

            ctx.orders().advance(&order, next, Some(&assignee)).await?;
            ctx.audits()
                .record(NewAudit {
                    order_id: order.id,
                    actor_user_id: None,
                    from_status: Some(order.status),
                    to_status: next,
                    reason: REASON_ACCEPT.to_string(),
                    payload,
                })
                .await?;

            load_order(&ctx, id).await
        })?;

        tracing::info!(order_id = id, player = %player, "Order accepted");
        Ok(order)
    }

    async fn complete_order(&self, id: i64, input: CompleteOrder) -> AppResult<Order> {
        require_identity("actor_kook_id", &input.actor_kook_id)?;
        let actor_kook_id = input.actor_kook_id;
        let payload = non_empty_payload(input.payload);

        let order = with_transaction!(self.uow, |ctx| {
            let order = load_order(&ctx, id).await?;
            let next = order.status.apply(LifecycleOp::Complete)?;
            let actor = resolve_identity(&ctx, &actor_kook_id, Some(ROLE_PLAYER)).await?;

            ctx.orders().advance(&order, next, None).await?;
            let audits = ctx.audits();
            audits
                .record(NewAudit {
                    order_id: order.id,
                    actor_user_id: Some(actor.id),
                    from_status: Some(order.status),
                    to_status: next,
                    reason: REASON_COMPLETED.to_string(),
                    payload: None,
                })
                .await?;

            let receipt_payload = match payload {
                Some(payload) => payload,
                None => CompletionSnapshot::new(&order, actor.display_name.clone()).to_value()?,
            };
            audits
                .record_receipt(order.id, ReceiptType::Completion, receipt_payload)
                .await?;

            load_order(&ctx, id).await
        })?;

        tracing::info!(order_id = id, status = %order.status, "Order completed");
        Ok(order)
    }

    async fn order_audits(&self, id: i64) -> AppResult<Vec<OrderAudit>> {
        self.existing_order(id).await?;
        self.uow.orders().list_audits(id).await
    }

    async fn order_receipts(&self, id: i64) -> AppResult<Vec<Receipt>> {
        self.existing_order(id).await?;
        self.uow.orders().list_receipts(id).await
    }
}
