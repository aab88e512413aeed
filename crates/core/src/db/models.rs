//! Record and metadata value types for the index store.

use serde::{Deserialize, Serialize};

/// A project row: the top-level aggregate a corpus is organized under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: i64,
    pub name: String,
    pub repo: Option<String>,
}

/// A version row: one named build of a project on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: i64,
    pub name: String,
    pub platform: i32,
    pub project_id: i64,
}

/// Caller-supplied identity for a source about to be ingested.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    pub name: String,
    pub project_id: i64,
    pub version_id: Option<i64>,
    pub platform: i32,
    pub source_link: Option<String>,
}

/// What `insert_source` hands back: the created ids plus a little ingest
/// accounting.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReceipt {
    pub source_id: i64,
    pub source_slug: String,
    pub object_id: i64,
    pub object_hash: String,
    /// False when the object blob was already known and only deduplicated.
    pub object_created: bool,
    pub symbols: usize,
    pub windows: usize,
}

/// A source row joined with its object and owning project/version context.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFull {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub source_link: Option<String>,
    pub platform: i32,
    pub object_id: i64,
    pub object_hash: String,
    pub object_path: String,
    pub version_id: Option<i64>,
    pub version_name: Option<String>,
    pub project_id: i64,
    pub project_name: String,
    pub project_repo: Option<String>,
}

/// Everything the store knows about one symbol, fingerprints included.
#[derive(Debug, Clone)]
pub struct SymbolFull {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub len: i64,
    pub symbol_idx: i64,
    pub is_decompiled: bool,
    pub opcode_hash: u64,
    pub equiv_hash: u64,
    pub exact_hash: u64,
    pub source_id: i64,
    pub source_name: String,
    pub platform: i32,
    pub object_path: String,
    pub version_id: Option<i64>,
    pub version_name: Option<String>,
    pub project_id: i64,
    pub project_name: String,
    pub project_repo: Option<String>,
}

impl SymbolFull {
    pub fn meta(&self) -> SymbolMeta {
        SymbolMeta {
            slug: self.slug.clone(),
            name: self.name.clone(),
            len: self.len,
            is_decompiled: self.is_decompiled,
            source_id: self.source_id,
            source_name: self.source_name.clone(),
            version_id: self.version_id,
            version_name: self.version_name.clone(),
            project_id: self.project_id,
            project_name: self.project_name.clone(),
            project_repo: self.project_repo.clone(),
            platform: self.platform,
        }
    }
}

/// The externally visible symbol metadata shape: what search, full-match,
/// and submatch results carry per symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMeta {
    pub slug: String,
    pub name: String,
    pub len: i64,
    pub is_decompiled: bool,
    pub source_id: i64,
    pub source_name: String,
    pub version_id: Option<i64>,
    pub version_name: Option<String>,
    pub project_id: i64,
    pub project_name: String,
    pub project_repo: Option<String>,
    pub platform: i32,
}

/// The three full-match buckets. Computed independently per fidelity; a
/// symbol may legitimately appear in more than one (consumers decide how to
/// merge).
#[derive(Debug, Clone, Default, Serialize)]
pub struct FullMatches {
    pub exact: Vec<SymbolMeta>,
    pub equivalent: Vec<SymbolMeta>,
    pub opcode: Vec<SymbolMeta>,
}

/// One window self-join hit: the query symbol's window at `query_pos`
/// shares its hash with `symbol_id`'s window at `match_pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub symbol_id: i64,
    pub query_pos: i64,
    pub match_pos: i64,
}

impl Anchor {
    /// The diagonal this anchor lies on. Anchors on one diagonal with
    /// consecutive `query_pos` values form a single contiguous run.
    pub fn diagonal(&self) -> i64 {
        self.query_pos - self.match_pos
    }
}

/// Row counts across the whole index, for the status surface.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IndexCounts {
    pub projects: i64,
    pub versions: i64,
    pub objects: i64,
    pub sources: i64,
    pub symbols: i64,
    pub windows: i64,
}
