//! Index configuration: where the database and blobs live, and the two
//! constants every fingerprint depends on.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::fingerprint::DEFAULT_HASH_SEED;

/// Default window width. This is also the minimum submatch length the index
/// can answer for.
pub const DEFAULT_WINDOW_WIDTH: usize = 8;

/// Deployment-wide configuration for an index.
///
/// `hash_seed` and `window_width` are baked into every stored fingerprint
/// and window; changing either invalidates the index and requires a full
/// re-ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
    /// Directory the object blobs are spilled into.
    pub blob_root: PathBuf,
    /// Seed for the 64-bit folding hash.
    pub hash_seed: u64,
    /// Window width `W` in instructions.
    pub window_width: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("symhound.db"),
            blob_root: PathBuf::from("blobs"),
            hash_seed: DEFAULT_HASH_SEED,
            window_width: DEFAULT_WINDOW_WIDTH,
        }
    }
}

impl IndexConfig {
    /// Build a configuration from the environment, falling back to defaults:
    /// `SYMHOUND_DB`, `SYMHOUND_BLOBS`, `SYMHOUND_HASH_SEED`,
    /// `SYMHOUND_WINDOW`. Unparsable numeric values are ignored with a
    /// warning rather than silently misconfiguring the index.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = env::var("SYMHOUND_DB") {
            config.db_path = PathBuf::from(value);
        }
        if let Ok(value) = env::var("SYMHOUND_BLOBS") {
            config.blob_root = PathBuf::from(value);
        }
        if let Ok(value) = env::var("SYMHOUND_HASH_SEED") {
            match value.parse::<u64>() {
                Ok(seed) => config.hash_seed = seed,
                Err(_) => log::warn!("ignoring unparsable SYMHOUND_HASH_SEED {value:?}"),
            }
        }
        if let Ok(value) = env::var("SYMHOUND_WINDOW") {
            match value.parse::<usize>() {
                Ok(width) if width > 0 => config.window_width = width,
                _ => log::warn!("ignoring unparsable SYMHOUND_WINDOW {value:?}"),
            }
        }
        config
    }
}
