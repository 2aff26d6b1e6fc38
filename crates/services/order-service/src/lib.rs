//! Order Service Library
//!
//! Order lifecycle backend for a game-boosting marketplace: order creation,
//! review, acceptance by a player and completion with a receipt, exposed
//! over HTTP.

pub mod api;
pub mod config;
pub mod infra;
pub mod repository;
pub mod seed;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::OrderServiceConfig;
use crate::infra::Database;

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Connect, apply pending migrations and serve HTTP until Ctrl-C.
pub async fn run_server(config: OrderServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let database = Arc::new(Database::connect(&config.database).await?);
    let app = create_router(AppState::from_database(database));

    let addr: SocketAddr = config.service.addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("{} listening on http://{}", config.service.service_name, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: OrderServiceConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, status) in db.migration_status().await? {
                println!("{:<8} {}", status, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Bind the default identities (for CLI commands).
pub async fn run_seed(config: OrderServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let database = Arc::new(Database::connect(&config.database).await?);
    let state = AppState::from_database(database);

    let report = seed::seed_identities(state.identity_service.as_ref()).await?;
    info!(
        created = report.created,
        skipped = report.skipped,
        "Seed finished"
    );

    Ok(())
}
