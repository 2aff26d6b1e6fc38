//! Connection pool for the order store and the `migrate` subcommands.

use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, Statement,
};
use sea_orm_migration::{MigrationStatus, MigratorTrait};

use common::DatabaseConfig;

use super::migrations::Migrator;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pooled handle on the orders database
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open the pool and bring the schema up to date. Used by `serve` and `seed`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let db = Self::connect_without_migrations(config).await?;
        db.run_migrations().await?;
        tracing::info!(
            max_connections = config.max_connections,
            "Order store ready"
        );
        Ok(db)
    }

    /// Open the pool and leave the schema alone, for the `migrate` subcommands.
    pub async fn connect_without_migrations(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(CONNECT_TIMEOUT)
            .sqlx_logging(false);

        Ok(Self {
            connection: SeaDatabase::connect(options).await?,
        })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Owned connection handle for a unit of work.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Undo the most recent migration (`migrate down`).
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Every known migration in order, with whether it has been applied.
    ///
    /// Fails when the database records a migration this build does not know.
    pub async fn migration_status(&self) -> Result<Vec<(String, MigrationStatus)>, DbErr> {
        let migrations = Migrator::get_migration_with_status(&self.connection).await?;
        Ok(migrations
            .iter()
            .map(|m| (m.name().to_string(), m.status()))
            .collect())
    }

    /// Drop every table, then migrate from scratch (`migrate fresh`).
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }

    /// Round trip used by `GET /health`.
    pub async fn ping(&self) -> Result<(), DbErr> {
        let backend = self.connection.get_database_backend();
        self.connection
            .execute(Statement::from_string(backend, "SELECT 1"))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        }
    }

    #[tokio::test]
    async fn status_reflects_applied_migrations() {
        let db = Database::connect_without_migrations(&memory_config())
            .await
            .unwrap();

        let before = db.migration_status().await.unwrap();
        assert!(!before.is_empty());
        assert!(before
            .iter()
            .all(|(_, status)| *status == MigrationStatus::Pending));

        db.run_migrations().await.unwrap();
        let after = db.migration_status().await.unwrap();
        assert_eq!(after.len(), before.len());
        assert!(after
            .iter()
            .all(|(_, status)| *status == MigrationStatus::Applied));

        db.rollback_migration().await.unwrap();
        let rolled_back = db.migration_status().await.unwrap();
        assert_eq!(
            rolled_back.last().map(|(_, status)| *status),
            Some(MigrationStatus::Pending)
        );
    }

    #[tokio::test]
    async fn ping_succeeds_on_open_pool() {
        let db = Database::connect(&memory_config()).await.unwrap();
        assert!(db.ping().await.is_ok());
    }
}
