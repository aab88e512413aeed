//! Full-symbol and submatch queries.
//!
//! Submatch reconstruction works off the window self-join: every shared
//! window hash between the query symbol and another symbol is an anchor
//! `(S, q, m)` on diagonal `d = q - m`. Anchors on one diagonal with
//! consecutive `q` values are a single contiguous run of identical windows;
//! a run of `k` anchors covers `k + W - 1` instructions. The store returns
//! anchors ordered `(symbol, diagonal, q)`, so one linear pass reconstructs
//! every maximal run. Grouping happens here in application code rather than
//! in SQL, which keeps the database's share down to the indexed join.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::models::{Anchor, FullMatches, SymbolFull, SymbolMeta};
use crate::db::{DbResult, IndexDb, StoreError};

/// Default cap on the anchor fan-out of a single submatch query.
pub const DEFAULT_ANCHOR_CAP: usize = 1_000_000;

/// How many anchors are processed between cancellation polls.
const CANCEL_POLL_STRIDE: usize = 1024;

/// Sort key for submatch results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmatchOrder {
    Length,
    QueryStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A submatch request against one query symbol.
#[derive(Debug, Clone)]
pub struct SubmatchQuery {
    pub symbol_id: i64,
    /// Instruction-index range to search, inclusive. Defaults to the whole
    /// symbol.
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// Minimum match length in instructions. Values below the window width
    /// are clamped up to it: the index cannot see shorter runs.
    pub min_len: i64,
    pub sort_by: SubmatchOrder,
    pub sort_dir: SortDirection,
    pub page: i64,
    pub page_size: i64,
}

impl SubmatchQuery {
    pub fn new(symbol_id: i64, min_len: i64) -> Self {
        Self {
            symbol_id,
            start: None,
            end: None,
            min_len,
            sort_by: SubmatchOrder::Length,
            sort_dir: SortDirection::Desc,
            page: 0,
            page_size: 50,
        }
    }
}

/// One maximal shared run: `len` instructions starting at `query_start` in
/// the query symbol and `match_start` in `symbol`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmatchRow {
    pub symbol: SymbolMeta,
    pub query_start: i64,
    pub match_start: i64,
    pub len: i64,
}

/// A page of submatch results. `total_count` is the size of the full result
/// set, before pagination.
#[derive(Debug, Clone, Serialize)]
pub struct SubmatchPage {
    pub total_count: i64,
    pub rows: Vec<SubmatchRow>,
}

/// Shared cancellation flag. Once set, an in-flight submatch returns
/// `Cancelled` instead of any partial result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Matching queries over one index.
///
/// The service never opens a write transaction; ingestion and matching can
/// interleave freely under WAL.
pub struct MatchService<'a> {
    db: &'a IndexDb,
    anchor_cap: usize,
}

impl<'a> MatchService<'a> {
    pub fn new(db: &'a IndexDb) -> Self {
        Self { db, anchor_cap: DEFAULT_ANCHOR_CAP }
    }

    /// Override the anchor fan-out cap (mainly for tests and small
    /// deployments).
    pub fn with_anchor_cap(mut self, cap: usize) -> Self {
        self.anchor_cap = cap;
        self
    }

    /// The three full-match buckets for a symbol.
    pub fn full_matches(&self, symbol_id: i64) -> DbResult<FullMatches> {
        self.db.find_full_matches(symbol_id)
    }

    /// All maximal shared runs of at least `min_len` instructions between
    /// the query symbol and every other symbol, sorted and paginated.
    pub fn find_submatches(
        &self,
        query: &SubmatchQuery,
        cancel: &CancelToken,
    ) -> DbResult<SubmatchPage> {
        let width = self.db.config().window_width as i64;

        if query.page < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "page must be non-negative, got {}",
                query.page
            )));
        }
        if query.page_size < 1 {
            return Err(StoreError::InvalidArgument(format!(
                "page_size must be positive, got {}",
                query.page_size
            )));
        }

        let symbol = self.db.get_symbol_by_id(query.symbol_id)?;

        // A symbol shorter than one window owns no windows at all; that is
        // an empty result, not an error.
        if symbol.len < width {
            return Ok(SubmatchPage { total_count: 0, rows: Vec::new() });
        }

        let start = query.start.unwrap_or(0);
        if start < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "start must be non-negative, got {start}"
            )));
        }
        let requested_end = query.end.unwrap_or(symbol.len - 1);
        if start > requested_end {
            return Err(StoreError::InvalidRange { start, end: requested_end });
        }
        let end = requested_end.min(symbol.len - 1);

        let mut min_len = query.min_len;
        if min_len < width {
            log::warn!(
                "minimum match length {min_len} is below the window width {width}; clamping"
            );
            min_len = width;
        }

        // The last window that still fits inside [start, end].
        let last_anchor_pos = end - width + 1;
        if last_anchor_pos < start {
            return Ok(SubmatchPage { total_count: 0, rows: Vec::new() });
        }

        let anchors = self
            .db
            .anchors_for(symbol.id, start, last_anchor_pos, self.anchor_cap)?;
        if anchors.len() > self.anchor_cap {
            return Err(StoreError::ResourceExhausted {
                anchors: anchors.len(),
                cap: self.anchor_cap,
            });
        }

        let runs = collect_runs(&anchors, width, min_len, cancel)?;
        let total_count = runs.len() as i64;

        // Join metadata for every distinct matched symbol; the sort tiebreak
        // needs project and source ids.
        let mut metas: HashMap<i64, SymbolFull> = HashMap::new();
        for run in &runs {
            if cancel.is_cancelled() {
                return Err(StoreError::Cancelled);
            }
            if !metas.contains_key(&run.symbol_id) {
                let meta = self.db.get_symbol_by_id(run.symbol_id).map_err(|err| match err {
                    StoreError::NotFound(what) => {
                        StoreError::Integrity(format!("window references missing {what}"))
                    }
                    other => other,
                })?;
                metas.insert(run.symbol_id, meta);
            }
        }

        let mut sortable: Vec<(i64, i64, RawRun)> = Vec::with_capacity(runs.len());
        for run in runs {
            let meta = metas.get(&run.symbol_id).ok_or_else(|| {
                StoreError::Integrity(format!("missing metadata for symbol id {}", run.symbol_id))
            })?;
            sortable.push((meta.project_id, meta.source_id, run));
        }

        sortable.sort_by(|(pa, sa, a), (pb, sb, b)| {
            let primary = match query.sort_by {
                SubmatchOrder::Length => a.len.cmp(&b.len),
                SubmatchOrder::QueryStart => a.q0.cmp(&b.q0),
            };
            let primary = match query.sort_dir {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary
                .then_with(|| pa.cmp(pb))
                .then_with(|| sa.cmp(sb))
                .then_with(|| a.symbol_id.cmp(&b.symbol_id))
                .then_with(|| a.q0.cmp(&b.q0))
                .then_with(|| a.m0.cmp(&b.m0))
        });

        let offset = (query.page * query.page_size) as usize;
        let rows = sortable
            .into_iter()
            .skip(offset)
            .take(query.page_size as usize)
            .map(|(_, _, run)| {
                let meta = metas
                    .get(&run.symbol_id)
                    .ok_or_else(|| {
                        StoreError::Integrity(format!(
                            "missing metadata for symbol id {}",
                            run.symbol_id
                        ))
                    })?
                    .meta();
                Ok(SubmatchRow {
                    symbol: meta,
                    query_start: run.q0,
                    match_start: run.m0,
                    len: run.len,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(SubmatchPage { total_count, rows })
    }
}

/// A reconstructed maximal run, before metadata is joined.
#[derive(Debug, Clone, Copy)]
struct RawRun {
    symbol_id: i64,
    q0: i64,
    m0: i64,
    len: i64,
}

/// Fold ordered anchors into maximal runs and keep those of at least
/// `min_len` instructions. Anchors must arrive ordered
/// `(symbol, diagonal, query_pos)`.
fn collect_runs(
    anchors: &[Anchor],
    width: i64,
    min_len: i64,
    cancel: &CancelToken,
) -> DbResult<Vec<RawRun>> {
    let mut runs = Vec::new();
    // (first anchor of the open run, query_pos of its latest anchor)
    let mut current: Option<(Anchor, i64)> = None;

    let flush = |first: Anchor, last_q: i64, runs: &mut Vec<RawRun>| {
        let len = (last_q - first.query_pos + 1) + width - 1;
        if len >= min_len {
            runs.push(RawRun {
                symbol_id: first.symbol_id,
                q0: first.query_pos,
                m0: first.match_pos,
                len,
            });
        }
    };

    for (i, anchor) in anchors.iter().enumerate() {
        if i % CANCEL_POLL_STRIDE == 0 && cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let mut extended = false;
        if let Some((first, last_q)) = current.as_mut() {
            if first.symbol_id == anchor.symbol_id
                && first.diagonal() == anchor.diagonal()
                && anchor.query_pos == *last_q + 1
            {
                *last_q = anchor.query_pos;
                extended = true;
            }
        }
        if !extended {
            if let Some((first, last_q)) = current.take() {
                flush(first, last_q, &mut runs);
            }
            current = Some((*anchor, anchor.query_pos));
        }
    }
    if let Some((first, last_q)) = current {
        flush(first, last_q, &mut runs);
    }

    Ok(runs)
}
