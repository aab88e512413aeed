pub mod ingest;
pub mod projects;
pub mod query;
pub mod status;

pub use ingest::*;
pub use projects::*;
pub use query::*;
pub use status::*;

use std::fs;

use anyhow::{Context, Result};
use symhound_core::db::{IndexConfig, IndexDb};

/// Open (or create) the index the configuration points at, making sure the
/// directories it needs exist first.
pub fn open_index(config: IndexConfig) -> Result<IndexDb> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }
    fs::create_dir_all(&config.blob_root)
        .with_context(|| format!("Failed to create blob root {}", config.blob_root.display()))?;

    let db_path = config.db_path.clone();
    IndexDb::open(config)
        .with_context(|| format!("Failed to open index database at {}", db_path.display()))
}
