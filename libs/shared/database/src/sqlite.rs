//! SQLite connection pool and schema bootstrap for the patients table.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use shared_config::AppConfig;

use crate::error::DatabaseError;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        age INTEGER NOT NULL,
        gender TEXT NOT NULL,
        phone TEXT NOT NULL,
        address TEXT NOT NULL,
        disease TEXT NOT NULL,
        symptoms TEXT NOT NULL,
        appointment_time TEXT NOT NULL,
        registered_at TEXT NOT NULL,
        doctor TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Pending'
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_phone ON patients(phone)",
    "CREATE INDEX IF NOT EXISTS idx_doctor ON patients(doctor)",
    "CREATE INDEX IF NOT EXISTS idx_status ON patients(status)",
    "CREATE INDEX IF NOT EXISTS idx_appointment_time ON patients(appointment_time)",
];

/// Opens the pool described by the config and makes sure the schema exists.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool, DatabaseError> {
    connect_with_url(&config.database_url, config.database_max_connections).await
}

pub async fn connect_with_url(url: &str, max_connections: u32) -> Result<SqlitePool, DatabaseError> {
    info!(max_connections, "Opening SQLite pool at {}", url);

    let options = SqliteConnectOptions::from_str(url)
        .map_err(|source| DatabaseError::InvalidUrl {
            url: url.to_string(),
            source,
        })?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
        .map_err(DatabaseError::Connection)?;

    bootstrap_schema(&pool).await?;

    Ok(pool)
}

/// Idempotent; safe to run against an existing database.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<(), DatabaseError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(DatabaseError::Schema)?;
    }

    debug!("Patients schema is in place");
    Ok(())
}
