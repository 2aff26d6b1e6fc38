//! Transaction-level tests: savepointed identity inserts, compare-and-set
//! status updates and rollback of partial work.

mod support;

use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use common::{AppError, AppResult};
use domain::{NewAudit, OrderStatus, ReceiptType, UserRole};
use order_service_lib::api::AppState;
use order_service_lib::infra::{Persistence, UnitOfWork};
use order_service_lib::repository::entities::{ExternalBindingEntity, UserEntity};
use order_service_lib::with_transaction;

use support::{create_cmd, setup_database};

/// Services and a raw unit of work sharing one in-memory database
async fn setup() -> (AppState, Persistence) {
    let database = setup_database().await;
    let uow = Persistence::new(database.get_connection());
    (AppState::from_database(database), uow)
}

#[tokio::test]
async fn duplicate_binding_rolls_back_to_savepoint() {
    let (state, uow) = setup().await;

    let result = with_transaction!(uow, |ctx| {
        let identities = ctx.identities();
        let first = identities
            .insert_with_binding("X1", "kook_X1", UserRole::Boss)
            .await?;
        let second = identities
            .insert_with_binding("X1", "kook_X1", UserRole::Player)
            .await?;
        let reread = identities.find_by_external_id("X1").await?;
        Ok((first, second, reread))
    });
    let (first, second, reread) = assert_ok!(result);

    let first = first.expect("first insert binds the id");
    assert!(second.is_none());
    assert_eq!(reread, Some(first.clone()));
    assert_eq!(first.role, UserRole::Boss);

    let db = state.database.connection();
    assert_eq!(UserEntity::find().count(db).await.unwrap(), 1);
    assert_eq!(ExternalBindingEntity::find().count(db).await.unwrap(), 1);

    // the committed binding is what later resolutions see
    let resolved = state.identity_service.resolve("X1", None).await.unwrap();
    assert_eq!(resolved, first);
}

#[tokio::test]
async fn stale_expected_status_changes_nothing() {
    let (state, uow) = setup().await;
    let order = state
        .order_service
        .create_order(create_cmd("LOL", 3000, dec!(1.5)))
        .await
        .unwrap();
    let id = order.id;

    let swapped = with_transaction!(uow, |ctx| {
        ctx.orders()
            .compare_and_set_status(
                id,
                OrderStatus::ReviewApproved,
                OrderStatus::InProgress,
                None,
            )
            .await
    });
    assert!(!assert_ok!(swapped));

    let stored = state.order_service.get_order(id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::PendingReview);
}

#[tokio::test]
async fn advance_on_outdated_snapshot_reports_current_status() {
    let (state, uow) = setup().await;
    let order = state
        .order_service
        .create_order(create_cmd("LOL", 3000, dec!(1.5)))
        .await
        .unwrap();
    let id = order.id;

    let result: AppResult<()> = with_transaction!(uow, |ctx| {
        let orders = ctx.orders();
        let snapshot = orders.find_by_id(id).await?.expect("order exists");

        // another transition lands between the read and the write
        let moved = orders
            .compare_and_set_status(
                id,
                OrderStatus::PendingReview,
                OrderStatus::ReviewApproved,
                None,
            )
            .await?;
        assert!(moved);

        orders
            .advance(&snapshot, OrderStatus::ReviewRejected, None)
            .await?;
        Ok(())
    });

    let err = assert_err!(result);
    assert!(
        matches!(err, AppError::InvalidState(ref msg) if msg == "invalid state: REVIEW_APPROVED. expect PENDING_REVIEW")
    );

    let stored = state.order_service.get_order(id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::PendingReview);
}

#[tokio::test]
async fn failure_after_writes_rolls_back_everything() {
    let (state, uow) = setup().await;
    let order = state
        .order_service
        .create_order(create_cmd("LOL", 3000, dec!(1.5)))
        .await
        .unwrap();
    let id = order.id;

    let result: AppResult<()> = with_transaction!(uow, |ctx| {
        let order = ctx.orders().find_by_id(id).await?.expect("order exists");
        ctx.orders()
            .advance(&order, OrderStatus::ReviewApproved, None)
            .await?;

        let audits = ctx.audits();
        audits
            .record(NewAudit {
                order_id: id,
                actor_user_id: None,
                from_status: Some(OrderStatus::PendingReview),
                to_status: OrderStatus::ReviewApproved,
                reason: "approved".to_string(),
                payload: None,
            })
            .await?;
        audits
            .record_receipt(id, ReceiptType::Completion, json!({"note": "discarded"}))
            .await?;

        Err(AppError::internal("downstream failure"))
    });
    assert!(matches!(result, Err(AppError::Internal(_))));

    let orders = state.order_service.clone();
    assert_eq!(
        orders.get_order(id).await.unwrap().status,
        OrderStatus::PendingReview
    );
    let audits = orders.order_audits(id).await.unwrap();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].to_status, OrderStatus::PendingReview);
    assert!(orders.order_receipts(id).await.unwrap().is_empty());
}
