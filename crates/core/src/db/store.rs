//! `IndexDb`: the SQLite-backed index store.
//!
//! One connection, one schema, four jobs:
//! - Opening/creating the database file and applying schema migrations.
//! - Ingesting sources transactionally (object dedup, symbols, windows).
//! - The joined metadata queries every read surface is built from.
//! - The window self-join the submatch service consumes as anchors.

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::backends;
use crate::db::models::{
    Anchor, FullMatches, IndexCounts, ProjectRecord, SourceFull, SourceMeta, SourceReceipt,
    SymbolFull, SymbolMeta, VersionRecord,
};
use crate::db::{slug, unique_failure_on, DbResult, IndexConfig, StoreError};
use crate::fingerprint::windows::{extract_windows, WindowHash};
use crate::fingerprint::{equivalence_stream, fingerprint_symbol, Fingerprints};
use crate::model::{Instruction, SymbolListing};

/// Oldest `user_version` this build can still open. A brand-new database
/// reports `0` and gets the full schema applied on first open.
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// `user_version` stamped by this build. A database carrying a newer stamp
/// is refused outright: every fingerprint and window query depends on the
/// exact table shapes, so guessing at an unknown schema would corrupt
/// results silently.
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// How often we redraw a colliding slug before giving up. The slug space is
/// 62^5, so running out of attempts means something else is wrong.
const MAX_SLUG_ATTEMPTS: usize = 16;

/// Result cap for the best-effort name search.
const NAME_SEARCH_LIMIT: i64 = 50;

/// Shared SELECT head for every query that returns symbol rows with their
/// full project/source/version context. Callers append WHERE/ORDER clauses.
const SYMBOL_SELECT: &str = "\
SELECT symbols.id, symbols.slug, symbols.name, symbols.len, symbols.symbol_idx,
       symbols.is_decompiled, symbols.opcode_hash, symbols.equiv_hash, symbols.exact_hash,
       symbols.source_id, sources.name, sources.platform, objects.local_path,
       versions.id, versions.name,
       projects.id, projects.name, projects.repo
FROM symbols
INNER JOIN sources ON sources.id = symbols.source_id
INNER JOIN objects ON objects.id = sources.object_id
LEFT JOIN versions ON versions.id = sources.version_id
INNER JOIN projects ON projects.id = sources.project_id";

const SOURCE_SELECT: &str = "\
SELECT sources.id, sources.slug, sources.name, sources.source_link, sources.platform,
       objects.id, objects.hash, objects.local_path,
       versions.id, versions.name,
       projects.id, projects.name, projects.repo
FROM sources
INNER JOIN objects ON objects.id = sources.object_id
LEFT JOIN versions ON versions.id = sources.version_id
INNER JOIN projects ON projects.id = sources.project_id";

/// SQLite-backed index store.
pub struct IndexDb {
    conn: Connection,
    config: IndexConfig,
}

impl IndexDb {
    /// Open (or create) the index database named by the configuration and
    /// ensure the schema exists.
    pub fn open(config: IndexConfig) -> DbResult<Self> {
        let conn = Connection::open(&config.db_path)?;
        Self::from_connection(conn, config)
    }

    /// In-memory index, mainly for tests.
    pub fn open_in_memory(config: IndexConfig) -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, config)
    }

    fn from_connection(conn: Connection, config: IndexConfig) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        // WAL keeps readers unblocked while an ingestion commits. The pragma
        // reports the resulting mode ("memory" for in-memory DBs), which we
        // don't need to inspect.
        let _mode: String =
            conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        apply_migrations(&conn)?;
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Raw access to the connection. Tests use this to inspect window rows
    /// directly; application code should stay on the typed queries so the
    /// error taxonomy keeps applying.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ----- projects & versions -------------------------------------------

    /// Create a project and return its row id. A duplicate name is a
    /// `Conflict`.
    pub fn create_project(&self, name: &str, repo: Option<&str>) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO projects (name, repo, created_at) VALUES (?1, ?2, ?3)",
            params![name, repo, now_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_projects(&self) -> DbResult<Vec<ProjectRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, repo FROM projects ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ProjectRecord { id: row.get(0)?, name: row.get(1)?, repo: row.get(2)? })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn find_project_by_name(&self, name: &str) -> DbResult<Option<ProjectRecord>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, repo FROM projects WHERE name = ?1",
                params![name],
                |row| {
                    Ok(ProjectRecord { id: row.get(0)?, name: row.get(1)?, repo: row.get(2)? })
                },
            )
            .optional()?;
        Ok(project)
    }

    /// Delete a project; versions, sources, symbols, and windows go with it
    /// via cascade. Object rows (and blobs) are shared and stay behind.
    pub fn delete_project(&self, id: i64) -> DbResult<()> {
        let affected = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("project {id}")));
        }
        Ok(())
    }

    pub fn create_version(&self, project_id: i64, name: &str, platform: i32) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO versions (name, platform, project_id) VALUES (?1, ?2, ?3)",
            params![name, platform, project_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn versions_for_project(&self, project_id: i64) -> DbResult<Vec<VersionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, platform, project_id FROM versions WHERE project_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(VersionRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                platform: row.get(2)?,
                project_id: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ----- ingestion ------------------------------------------------------

    /// Ingest one source atomically: dedup the object blob by content hash,
    /// create the source, then every symbol with its fingerprints and
    /// windows. Either the whole source commits or nothing is visible.
    ///
    /// A duplicate (project, object, name) identity is a `Conflict`; any
    /// other constraint violation is an `Integrity` error.
    pub fn insert_source(
        &mut self,
        meta: &SourceMeta,
        object_bytes: &[u8],
        symbols: &[SymbolListing],
    ) -> DbResult<SourceReceipt> {
        // Fingerprinting is pure CPU; do all of it before the write
        // transaction opens.
        let seed = self.config.hash_seed;
        let width = self.config.window_width;
        let prepared: Vec<(Fingerprints, Vec<WindowHash>)> = symbols
            .iter()
            .map(|s| {
                let prints = fingerprint_symbol(&s.instructions, seed);
                let stream = equivalence_stream(&s.instructions, seed);
                let windows = extract_windows(&stream, width, seed);
                (prints, windows)
            })
            .collect();

        let object_hash = hex_sha256(object_bytes);
        let blob_path = self
            .config
            .blob_root
            .join(format!("{object_hash}.json"))
            .to_string_lossy()
            .into_owned();
        let blob_root = self.config.blob_root.clone();
        let created_at = now_rfc3339();

        let tx = self.conn.transaction()?;

        // Object dedup by content hash.
        let existing: Option<(i64, String)> = tx
            .query_row(
                "SELECT id, local_path FROM objects WHERE hash = ?1",
                params![object_hash],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (object_id, object_created, object_path) = match existing {
            Some((id, path)) => (id, false, path),
            None => {
                tx.execute(
                    "INSERT INTO objects (hash, local_path) VALUES (?1, ?2)",
                    params![object_hash, blob_path],
                )?;
                (tx.last_insert_rowid(), true, blob_path)
            }
        };

        // Source row, retrying the slug on collision.
        let mut source: Option<(i64, String)> = None;
        for _ in 0..MAX_SLUG_ATTEMPTS {
            let candidate = slug::new_slug();
            let inserted = tx.execute(
                "INSERT INTO sources (slug, name, source_link, platform, object_id, version_id, project_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    candidate,
                    meta.name,
                    meta.source_link,
                    meta.platform,
                    object_id,
                    meta.version_id,
                    meta.project_id,
                    created_at
                ],
            );
            match inserted {
                Ok(_) => {
                    source = Some((tx.last_insert_rowid(), candidate));
                    break;
                }
                Err(err) if unique_failure_on(&err, "sources.slug") => continue,
                Err(err) => return Err(err.into()),
            }
        }
        let (source_id, source_slug) = source.ok_or_else(slug_space_exhausted)?;

        // Symbols and their windows.
        let mut total_windows = 0usize;
        {
            let mut window_stmt =
                tx.prepare("INSERT INTO windows (pos, hash, symbol_id) VALUES (?1, ?2, ?3)")?;
            for (listing, (prints, windows)) in symbols.iter().zip(&prepared) {
                let mut symbol_id: Option<i64> = None;
                for _ in 0..MAX_SLUG_ATTEMPTS {
                    let candidate = slug::new_slug();
                    let inserted = tx.execute(
                        "INSERT INTO symbols (slug, name, len, symbol_idx, is_decompiled, opcode_hash, equiv_hash, exact_hash, source_id)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                        params![
                            candidate,
                            listing.name,
                            listing.instructions.len() as i64,
                            listing.symbol_idx,
                            listing.is_decompiled,
                            prints.opcode as i64,
                            prints.equiv as i64,
                            prints.exact as i64,
                            source_id
                        ],
                    );
                    match inserted {
                        Ok(_) => {
                            symbol_id = Some(tx.last_insert_rowid());
                            break;
                        }
                        Err(err) if unique_failure_on(&err, "symbols.slug") => continue,
                        Err(err) => return Err(err.into()),
                    }
                }
                let symbol_id = symbol_id.ok_or_else(slug_space_exhausted)?;

                for w in windows {
                    window_stmt.execute(params![w.pos, w.hash as i64, symbol_id])?;
                }
                total_windows += windows.len();
            }
        }

        // Spill the blob before committing; a failed write rolls the whole
        // ingestion back. On the dedup path the file is restored if it went
        // missing since the first ingest.
        if object_created || !Path::new(&object_path).exists() {
            fs::create_dir_all(&blob_root).map_err(|e| {
                StoreError::Unavailable(format!(
                    "failed to create blob root {}: {e}",
                    blob_root.display()
                ))
            })?;
            fs::write(&object_path, object_bytes).map_err(|e| {
                StoreError::Unavailable(format!("failed to write object blob {object_path}: {e}"))
            })?;
        }

        tx.commit()?;

        Ok(SourceReceipt {
            source_id,
            source_slug,
            object_id,
            object_hash,
            object_created,
            symbols: symbols.len(),
            windows: total_windows,
        })
    }

    // ----- symbol lookups -------------------------------------------------

    pub fn get_symbol(&self, slug: &str) -> DbResult<SymbolFull> {
        let sql = format!("{SYMBOL_SELECT} WHERE symbols.slug = ?1");
        self.conn
            .query_row(&sql, params![slug], map_symbol_full)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("symbol {slug}")))
    }

    pub fn get_symbol_by_id(&self, id: i64) -> DbResult<SymbolFull> {
        let sql = format!("{SYMBOL_SELECT} WHERE symbols.id = ?1");
        self.conn
            .query_row(&sql, params![id], map_symbol_full)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("symbol id {id}")))
    }

    /// Rehydrate a symbol's instruction stream from its stored object blob.
    pub fn get_symbol_instructions(&self, slug: &str) -> DbResult<Vec<Instruction>> {
        let symbol = self.get_symbol(slug)?;
        let path = Path::new(&symbol.object_path);
        if !path.exists() {
            return Err(StoreError::BackingStoreMissing(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|e| {
            StoreError::Unavailable(format!("failed to read object blob {}: {e}", path.display()))
        })?;
        let document = backends::parse_listing(&bytes).map_err(|e| {
            StoreError::Integrity(format!("stored blob {} is unreadable: {e}", path.display()))
        })?;
        let listing = document.symbol_by_idx(symbol.symbol_idx).ok_or_else(|| {
            StoreError::Integrity(format!(
                "symbol_idx {} missing from stored blob {}",
                symbol.symbol_idx,
                path.display()
            ))
        })?;
        Ok(listing.instructions.clone())
    }

    /// Best-effort substring search over symbol names for the search surface.
    pub fn find_by_name(&self, fragment: &str) -> DbResult<Vec<SymbolMeta>> {
        let sql = format!(
            "{SYMBOL_SELECT} WHERE symbols.name LIKE '%' || ?1 || '%'
             ORDER BY symbols.name, projects.id, sources.id, symbols.symbol_idx LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![fragment, NAME_SEARCH_LIMIT], map_symbol_full)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?.meta());
        }
        Ok(out)
    }

    // ----- matching primitives --------------------------------------------

    /// The three full-match buckets for a symbol, each computed
    /// independently on its fingerprint index and each excluding the query
    /// symbol itself.
    pub fn find_full_matches(&self, symbol_id: i64) -> DbResult<FullMatches> {
        let query = self.get_symbol_by_id(symbol_id)?;
        Ok(FullMatches {
            exact: self.matches_by_hash("exact_hash", query.exact_hash, query.id)?,
            equivalent: self.matches_by_hash("equiv_hash", query.equiv_hash, query.id)?,
            opcode: self.matches_by_hash("opcode_hash", query.opcode_hash, query.id)?,
        })
    }

    fn matches_by_hash(
        &self,
        column: &str,
        hash: u64,
        exclude_id: i64,
    ) -> DbResult<Vec<SymbolMeta>> {
        let sql = format!(
            "{SYMBOL_SELECT} WHERE symbols.{column} = ?1 AND symbols.id != ?2
             ORDER BY projects.id, sources.id, symbols.symbol_idx"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![hash as i64, exclude_id], map_symbol_full)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?.meta());
        }
        Ok(out)
    }

    /// The window self-join: every other symbol's window sharing a hash with
    /// one of the query symbol's windows in `[first_pos, last_pos]`.
    ///
    /// Rows come back ordered `(symbol, diagonal, query_pos)` so the caller
    /// can reconstruct contiguous runs in one pass. At most `cap + 1` rows
    /// are returned; a result longer than `cap` means the fan-out cap was
    /// exceeded and the caller should refuse the query.
    pub fn anchors_for(
        &self,
        symbol_id: i64,
        first_pos: i64,
        last_pos: i64,
        cap: usize,
    ) -> DbResult<Vec<Anchor>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.symbol_id, a.pos, b.pos
             FROM windows a
             INNER JOIN windows b ON b.hash = a.hash
             WHERE a.symbol_id = ?1 AND b.symbol_id != ?1
               AND a.pos >= ?2 AND a.pos <= ?3
             ORDER BY b.symbol_id, a.pos - b.pos, a.pos
             LIMIT ?4",
        )?;
        let rows = stmt.query_map(
            params![symbol_id, first_pos, last_pos, (cap as i64) + 1],
            |row| {
                Ok(Anchor { symbol_id: row.get(0)?, query_pos: row.get(1)?, match_pos: row.get(2)? })
            },
        )?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Number of windows a symbol owns. Mainly an invariant check surface.
    pub fn window_count(&self, symbol_id: i64) -> DbResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM windows WHERE symbol_id = ?1",
            params![symbol_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ----- sources & clustering inputs ------------------------------------

    pub fn get_source(&self, slug: &str) -> DbResult<SourceFull> {
        let sql = format!("{SOURCE_SELECT} WHERE sources.slug = ?1");
        self.conn
            .query_row(&sql, params![slug], map_source_full)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("source {slug}")))
    }

    pub fn get_source_by_id(&self, id: i64) -> DbResult<SourceFull> {
        let sql = format!("{SOURCE_SELECT} WHERE sources.id = ?1");
        self.conn
            .query_row(&sql, params![id], map_source_full)
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("source id {id}")))
    }

    pub fn symbols_in_source(&self, source_id: i64) -> DbResult<Vec<SymbolFull>> {
        let sql = format!("{SYMBOL_SELECT} WHERE sources.id = ?1 ORDER BY symbols.symbol_idx");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![source_id], map_symbol_full)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn symbols_in_project(&self, project_id: i64) -> DbResult<Vec<SymbolFull>> {
        let sql = format!(
            "{SYMBOL_SELECT} WHERE projects.id = ?1 ORDER BY sources.id, symbols.symbol_idx"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![project_id], map_symbol_full)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ----- status ---------------------------------------------------------

    pub fn counts(&self) -> DbResult<IndexCounts> {
        Ok(IndexCounts {
            projects: self.count_table("projects")?,
            versions: self.count_table("versions")?,
            objects: self.count_table("objects")?,
            sources: self.count_table("sources")?,
            symbols: self.count_table("symbols")?,
            windows: self.count_table("windows")?,
        })
    }

    fn count_table(&self, table: &str) -> DbResult<i64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_symbol_full(row: &rusqlite::Row<'_>) -> rusqlite::Result<SymbolFull> {
    let opcode_hash: i64 = row.get(6)?;
    let equiv_hash: i64 = row.get(7)?;
    let exact_hash: i64 = row.get(8)?;
    Ok(SymbolFull {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        len: row.get(3)?,
        symbol_idx: row.get(4)?,
        is_decompiled: row.get(5)?,
        opcode_hash: opcode_hash as u64,
        equiv_hash: equiv_hash as u64,
        exact_hash: exact_hash as u64,
        source_id: row.get(9)?,
        source_name: row.get(10)?,
        platform: row.get(11)?,
        object_path: row.get(12)?,
        version_id: row.get(13)?,
        version_name: row.get(14)?,
        project_id: row.get(15)?,
        project_name: row.get(16)?,
        project_repo: row.get(17)?,
    })
}

fn map_source_full(row: &rusqlite::Row<'_>) -> rusqlite::Result<SourceFull> {
    Ok(SourceFull {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        source_link: row.get(3)?,
        platform: row.get(4)?,
        object_id: row.get(5)?,
        object_hash: row.get(6)?,
        object_path: row.get(7)?,
        version_id: row.get(8)?,
        version_name: row.get(9)?,
        project_id: row.get(10)?,
        project_name: row.get(11)?,
        project_repo: row.get(12)?,
    })
}

fn hex_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn slug_space_exhausted() -> StoreError {
    StoreError::Integrity(format!(
        "could not find a free slug in {MAX_SLUG_ATTEMPTS} attempts"
    ))
}

/// Walk the database forward to the current schema, tracking progress in
/// `PRAGMA user_version`.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (projects, versions, objects, sources, symbols,
///   windows, and the fingerprint/window indexes)
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::Integrity(format!(
            "unsupported schema version {current_version}; supported range is \
             {MIN_SUPPORTED_SCHEMA_VERSION}..={CURRENT_SCHEMA_VERSION}"
        )));
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS projects (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL UNIQUE,
                repo       TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS versions (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL,
                platform   INTEGER NOT NULL,
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS objects (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                hash       TEXT NOT NULL UNIQUE,
                local_path TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sources (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                slug        TEXT NOT NULL UNIQUE,
                name        TEXT NOT NULL,
                source_link TEXT,
                platform    INTEGER NOT NULL,
                object_id   INTEGER NOT NULL REFERENCES objects(id),
                version_id  INTEGER REFERENCES versions(id) ON DELETE CASCADE,
                project_id  INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL,
                UNIQUE (project_id, object_id, name)
            );

            CREATE TABLE IF NOT EXISTS symbols (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                slug          TEXT NOT NULL UNIQUE,
                name          TEXT NOT NULL,
                len           INTEGER NOT NULL,
                symbol_idx    INTEGER NOT NULL,
                is_decompiled INTEGER NOT NULL,
                opcode_hash   INTEGER NOT NULL,
                equiv_hash    INTEGER NOT NULL,
                exact_hash    INTEGER NOT NULL,
                source_id     INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS windows (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                pos       INTEGER NOT NULL,
                hash      INTEGER NOT NULL,
                symbol_id INTEGER NOT NULL REFERENCES symbols(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_symbols_opcode_hash ON symbols (opcode_hash);
            CREATE INDEX IF NOT EXISTS idx_symbols_equiv_hash  ON symbols (equiv_hash);
            CREATE INDEX IF NOT EXISTS idx_symbols_exact_hash  ON symbols (exact_hash);
            CREATE INDEX IF NOT EXISTS idx_windows_hash        ON windows (hash);
            CREATE INDEX IF NOT EXISTS idx_windows_symbol      ON windows (symbol_id);
            CREATE INDEX IF NOT EXISTS idx_windows_hash_symbol ON windows (hash, symbol_id);

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
