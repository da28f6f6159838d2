pub mod batch;
pub mod bbox;
pub mod query;

use anyhow::{Context, Result};
use antennes::{SqliteStore, StoreBuilder};
use std::path::PathBuf;

/// Open the store from the environment, with command-line overrides.
pub async fn open_store(db: Option<PathBuf>, max_connections: u32) -> Result<SqliteStore> {
    let mut builder = StoreBuilder::from_env().context("Invalid ANTENNES_* configuration")?;

    if let Some(path) = db {
        builder = builder.db_path(path);
    }

    let builder = builder.max_connections(max_connections);
    let store = builder
        .build()
        .await
        .context("Failed to open the supports database. Use --db or set ANTENNES_DB_PATH")?;

    Ok(store)
}
