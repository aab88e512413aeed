//! Read-side commands: search, symbol details, disassembly, full matches,
//! submatches, and duplicate clusters.

use anyhow::Result;
use serde::Serialize;
use symhound_core::db::{FullMatches, IndexConfig, SymbolMeta};
use symhound_core::services::{
    clusters_for_source, CancelToken, ClusterOptions, MatchService, SortDirection, SubmatchOrder,
    SubmatchQuery,
};

use crate::commands::open_index;

fn symbol_context(symbol: &SymbolMeta) -> String {
    match &symbol.version_name {
        Some(version) => format!("{} {} {}", symbol.project_name, version, symbol.source_name),
        None => format!("{} {}", symbol.project_name, symbol.source_name),
    }
}

fn symbol_line(symbol: &SymbolMeta) -> String {
    let decompiled = if symbol.is_decompiled { " (decompiled)" } else { "" };
    format!(
        "{} [{}] - {} insns - {}{}",
        symbol.name,
        symbol.slug,
        symbol.len,
        symbol_context(symbol),
        decompiled
    )
}

/// Substring search over symbol names.
pub fn search_command(config: IndexConfig, fragment: &str, json: bool) -> Result<()> {
    let db = open_index(config)?;
    let matches = db.find_by_name(fragment)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }
    if matches.is_empty() {
        println!("No symbols matching {fragment:?}");
        return Ok(());
    }
    for symbol in matches {
        println!("{}", symbol_line(&symbol));
    }
    Ok(())
}

/// Show a symbol's metadata.
pub fn show_command(config: IndexConfig, slug: &str, json: bool) -> Result<()> {
    let db = open_index(config)?;
    let symbol = db.get_symbol(slug)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&symbol.meta())?);
        return Ok(());
    }
    let meta = symbol.meta();
    println!("{}", symbol_line(&meta));
    println!("  opcode hash: {:016x}", symbol.opcode_hash);
    println!("  equiv hash:  {:016x}", symbol.equiv_hash);
    println!("  exact hash:  {:016x}", symbol.exact_hash);
    if meta.len < db.config().window_width as i64 {
        println!("  (too short for submatches)");
    }
    Ok(())
}

/// Print a symbol's disassembly, rehydrated from the stored object blob.
pub fn asm_command(config: IndexConfig, slug: &str, json: bool) -> Result<()> {
    let db = open_index(config)?;
    let instructions = db.get_symbol_instructions(slug)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&instructions)?);
        return Ok(());
    }
    for insn in &instructions {
        let mut line = String::new();
        if let Some(address) = &insn.address {
            line.push_str(address);
            line.push_str(": ");
        }
        line.push_str(&insn.opcode);
        if !insn.arguments.is_empty() {
            line.push(' ');
            line.push_str(&insn.arguments.join(","));
        }
        println!("{line}");
    }
    Ok(())
}

#[derive(Serialize)]
struct SymbolMatchEntry {
    subtype: &'static str,
    symbol: SymbolMeta,
}

/// Demote every matched symbol to the highest-fidelity bucket it appears
/// in. The core returns the buckets independently; merging is a consumer
/// decision.
fn tag_full_matches(matches: FullMatches) -> Vec<SymbolMatchEntry> {
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut entries = Vec::new();
    for (subtype, bucket) in [
        ("exact", matches.exact),
        ("equivalent", matches.equivalent),
        ("opcode", matches.opcode),
    ] {
        for symbol in bucket {
            if seen.insert(symbol.slug.clone()) {
                entries.push(SymbolMatchEntry { subtype, symbol });
            }
        }
    }
    entries
}

/// Whole-symbol matches at the three fidelities.
pub fn match_command(config: IndexConfig, slug: &str, json: bool) -> Result<()> {
    let db = open_index(config)?;
    let query = db.get_symbol(slug)?;
    let service = MatchService::new(&db);
    let entries = tag_full_matches(service.full_matches(query.id)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No matches found");
        return Ok(());
    }
    for entry in entries {
        println!("[{}] {}", entry.subtype, symbol_line(&entry.symbol));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn submatch_command(
    config: IndexConfig,
    slug: &str,
    min_len: i64,
    start: Option<i64>,
    end: Option<i64>,
    page: i64,
    page_size: i64,
    sort_by: SubmatchOrder,
    sort_dir: SortDirection,
    json: bool,
) -> Result<()> {
    let db = open_index(config)?;
    let query_symbol = db.get_symbol(slug)?;

    let mut query = SubmatchQuery::new(query_symbol.id, min_len);
    query.start = start;
    query.end = end;
    query.page = page;
    query.page_size = page_size;
    query.sort_by = sort_by;
    query.sort_dir = sort_dir;

    let service = MatchService::new(&db);
    let page_result = service.find_submatches(&query, &CancelToken::new())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page_result)?);
        return Ok(());
    }

    if page_result.total_count == 0 {
        println!("No submatches found");
        return Ok(());
    }
    println!(
        "{} submatches (showing {} from page {})",
        page_result.total_count,
        page_result.rows.len(),
        page
    );
    for row in &page_result.rows {
        println!(
            "  query [{}-{}] matches {} [{}-{}] ({} insns) - {}",
            row.query_start,
            row.query_start + row.len - 1,
            row.symbol.name,
            row.match_start,
            row.match_start + row.len - 1,
            row.len,
            symbol_context(&row.symbol)
        );
    }
    Ok(())
}

/// Show a source's metadata.
pub fn source_command(config: IndexConfig, slug: &str, json: bool) -> Result<()> {
    let db = open_index(config)?;
    let source = db.get_source(slug)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&source)?);
        return Ok(());
    }
    println!("{} [{}]", source.name, source.slug);
    println!("  Project: {}", source.project_name);
    if let Some(version) = &source.version_name {
        println!("  Version: {version}");
    }
    println!("  Object: {} ({})", source.object_hash, source.object_path);
    if let Some(link) = &source.source_link {
        println!("  Link: {link}");
    }
    Ok(())
}

/// Duplicate clusters within a source (or its whole project).
pub fn cluster_command(
    config: IndexConfig,
    source_slug: &str,
    min_size: usize,
    project_wide: bool,
    json: bool,
) -> Result<()> {
    let db = open_index(config)?;
    let source = db.get_source(source_slug)?;
    let options = ClusterOptions { min_size, project_wide };
    let clusters = clusters_for_source(&db, source.id, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&clusters)?);
        return Ok(());
    }
    if clusters.is_empty() {
        println!("No clusters of {min_size} or more symbols");
        return Ok(());
    }
    for cluster in clusters {
        println!("Cluster of {} ({:016x}):", cluster.size(), cluster.exact_hash);
        for symbol in &cluster.symbols {
            println!("  {}", symbol_line(symbol));
        }
    }
    Ok(())
}
