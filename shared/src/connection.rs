use anyhow::{Context, Result};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tracing::info;

use crate::config::DatabaseSettings;

pub type DbPool = Arc<DatabaseConnection>;

pub async fn connect_db(settings: &DatabaseSettings) -> Result<DbPool> {
    let db = Database::connect(settings.connect_options())
        .await
        .context("Failed to connect to database")?;

    info!(max_connections = settings.max_connections, "Connected to database");

    Ok(Arc::new(db))
}
