//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;

use common::DatabaseConfig;
use domain::{AcceptOrder, CompleteOrder, CreateOrder, ReviewOrder};
use order_service_lib::api::AppState;
use order_service_lib::infra::Database;

/// Fresh in-memory SQLite database with all migrations applied.
///
/// A single pooled connection keeps every test on the same memory database.
pub async fn setup_database() -> Arc<Database> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    Arc::new(
        Database::connect(&config)
            .await
            .expect("in-memory database should migrate"),
    )
}

pub async fn setup_state() -> AppState {
    AppState::from_database(setup_database().await)
}

pub fn create_cmd(game_name: &str, amount_cents: i64, duration_hours: Decimal) -> CreateOrder {
    CreateOrder {
        game_name: game_name.to_string(),
        amount_cents,
        duration_hours,
        boss_kook_id: "B1".to_string(),
        boss_kook_name: "Boss".to_string(),
    }
}

pub fn approve(reviewer: &str) -> ReviewOrder {
    ReviewOrder {
        reviewer_kook_id: reviewer.to_string(),
        approve: true,
        reason: None,
    }
}

pub fn reject(reviewer: &str, reason: &str) -> ReviewOrder {
    ReviewOrder {
        reviewer_kook_id: reviewer.to_string(),
        approve: false,
        reason: Some(reason.to_string()),
    }
}

pub fn accept(player: &str, name: Option<&str>) -> AcceptOrder {
    AcceptOrder {
        player_kook_id: player.to_string(),
        player_kook_name: name.map(str::to_string),
        payload: None,
    }
}

pub fn complete(actor: &str) -> CompleteOrder {
    CompleteOrder {
        actor_kook_id: actor.to_string(),
        payload: None,
    }
}
