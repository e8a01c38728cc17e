//! Database configuration module.
//!
//! This module handles `SQLite` connection settings and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the unique constraints declared on the entities (promo code, user email, booking
//! reference) exist in the store the engine relies on.

use crate::entities::{Booking, Experience, PromoCode, Slot, User};
use crate::errors::{Error, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema,
    sqlx::sqlite::SqliteJournalMode,
};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/bookit.sqlite?mode=rwc";

/// Connection settings, the `[database]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection URL, overridden by `DATABASE_URL`
    pub url: String,
    /// Upper bound of pooled connections
    pub max_connections: u32,
    /// How long a request waits for a connection before failing
    pub acquire_timeout_secs: u64,
    /// How long a statement waits for another connection's write lock
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            acquire_timeout_secs: 10,
            busy_timeout_secs: 5,
        }
    }
}

impl DatabaseSettings {
    /// Applies the `DATABASE_URL` environment override, if set.
    #[must_use]
    pub fn with_env_override(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.url = url;
        }
        self
    }
}

/// Establishes a pooled connection using the given settings.
///
/// A request that cannot obtain a connection within `acquire_timeout_secs` fails with a
/// persistence error instead of waiting indefinitely. File databases run in WAL mode, and a
/// writer queues for up to `busy_timeout_secs` behind another connection's write transaction.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    let busy_timeout = Duration::from_secs(settings.busy_timeout_secs);
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .sqlx_logging(false)
        .map_sqlx_sqlite_opts(move |opts| {
            opts.journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(busy_timeout)
        });

    ensure_sqlite_dir(&settings.url)?;
    debug!("Connecting to database");
    let db = Database::connect(options).await?;
    info!("Database connected");
    Ok(db)
}

/// Creates all tables from the entity definitions, parents first.
///
/// Existing tables are left untouched so the binary can be restarted against the same file.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Experience),
        schema.create_table_from_entity(Slot),
        schema.create_table_from_entity(PromoCode),
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Booking),
    ];
    for mut table in tables {
        db.execute(builder.build(table.if_not_exists())).await?;
    }

    Ok(())
}

/// Creates the parent directory of a file-backed `SQLite` URL.
fn ensure_sqlite_dir(url: &str) -> Result<()> {
    let Some(path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::Config {
            message: format!("Cannot create database directory {}: {e}", parent.display()),
        })?;
    }
    Ok(())
}
