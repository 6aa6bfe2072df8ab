use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::RegistryError;
use crate::models::Device;

/// Get current time as milliseconds since Unix epoch.
pub fn current_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Initialize database connection pool with recommended pragmas.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
}

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(include_str!("../migrations/001_create_devices.sql"))
        .execute(pool)
        .await?;
    Ok(())
}

/// Register a device. Names and webhook ids are both unique.
pub async fn insert_device(
    pool: &SqlitePool,
    webhook_id: &str,
    device_name: &str,
) -> Result<Device, RegistryError> {
    let result = sqlx::query(
        r#"
        INSERT INTO devices (webhook_id, device_name, created_epoch_ms)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(webhook_id)
    .bind(device_name)
    .bind(current_epoch_ms())
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(RegistryError::DuplicateDevice(device_name.to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let device = sqlx::query_as::<_, Device>(
        "SELECT id, webhook_id, device_name, created_epoch_ms FROM devices WHERE webhook_id = ?",
    )
    .bind(webhook_id)
    .fetch_one(pool)
    .await?;

    Ok(device)
}

/// All registered devices, oldest first.
pub async fn list_devices(pool: &SqlitePool) -> Result<Vec<Device>, sqlx::Error> {
    sqlx::query_as::<_, Device>(
        r#"
        SELECT id, webhook_id, device_name, created_epoch_ms
        FROM devices
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_device(pool: &SqlitePool, webhook_id: &str) -> Result<Option<Device>, sqlx::Error> {
    sqlx::query_as::<_, Device>(
        "SELECT id, webhook_id, device_name, created_epoch_ms FROM devices WHERE webhook_id = ?",
    )
    .bind(webhook_id)
    .fetch_optional(pool)
    .await
}

/// Delete a registration. Returns false if nothing matched.
pub async fn delete_device(pool: &SqlitePool, webhook_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM devices WHERE webhook_id = ?")
        .bind(webhook_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
