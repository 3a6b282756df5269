//! CLI command implementations.
//!
//! Each entity module exposes `execute`, which opens the cache for a single
//! command, and `run`, which works against an already started cache and is
//! shared with the interactive shell.

pub mod department;
pub mod employee;
pub mod init;
pub mod refresh;
pub mod role;
pub mod shell;

use anyhow::{Context, Result};

use crate::adapters::sqlite::SqliteGateway;
use crate::domain::models::Config;
use crate::services::OrgCache;

/// Build a cache over the configured database and start it.
pub async fn open_cache(config: &Config) -> Result<OrgCache<SqliteGateway>> {
    let mut cache = OrgCache::new(SqliteGateway::from_config(&config.database));
    cache
        .start()
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;
    Ok(cache)
}
