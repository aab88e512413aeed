//! Duplicate clustering by exact fingerprint.
//!
//! A cluster is a set of symbols sharing the same exact fingerprint, i.e.
//! byte-for-byte duplicate functions. Clustering is O(n) over the scoped
//! symbols once fingerprints exist and never touches the window index.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::models::SymbolMeta;
use crate::db::{DbResult, IndexDb};

/// Scope and threshold for a clustering request.
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    /// Minimum cluster cardinality to report.
    pub min_size: usize,
    /// Widen grouping from one source to its whole owning project. Off by
    /// default: cross-source clusters are routinely inflated by the same
    /// function appearing in every version.
    pub project_wide: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self { min_size: 2, project_wide: false }
    }
}

/// A group of symbols with identical exact fingerprints.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub exact_hash: u64,
    pub symbols: Vec<SymbolMeta>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.symbols.len()
    }
}

/// Group the symbols of a source (or, project-wide, of its owning project)
/// by exact fingerprint and return clusters of at least `min_size` symbols,
/// largest first.
pub fn clusters_for_source(
    db: &IndexDb,
    source_id: i64,
    options: &ClusterOptions,
) -> DbResult<Vec<Cluster>> {
    let symbols = if options.project_wide {
        let source = db.get_source_by_id(source_id)?;
        db.symbols_in_project(source.project_id)?
    } else {
        // Surface NotFound for a bogus source id even when it owns no symbols.
        db.get_source_by_id(source_id)?;
        db.symbols_in_source(source_id)?
    };

    // BTreeMap keeps cluster order deterministic across runs.
    let mut groups: BTreeMap<u64, Vec<SymbolMeta>> = BTreeMap::new();
    for symbol in symbols {
        groups.entry(symbol.exact_hash).or_default().push(symbol.meta());
    }

    let min_size = options.min_size.max(1);
    let mut clusters: Vec<Cluster> = groups
        .into_iter()
        .filter(|(_, members)| members.len() >= min_size)
        .map(|(exact_hash, symbols)| Cluster { exact_hash, symbols })
        .collect();

    clusters.sort_by_key(|c| std::cmp::Reverse(c.size()));
    Ok(clusters)
}
