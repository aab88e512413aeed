//! `status`: row counts across the whole index.

use anyhow::Result;
use symhound_core::db::IndexConfig;

use crate::commands::open_index;

pub fn status_command(config: IndexConfig, json: bool) -> Result<()> {
    let db = open_index(config)?;
    let counts = db.counts()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }
    println!("symhound index status");
    println!("  Database: {}", db.config().db_path.display());
    println!("  Projects: {}", counts.projects);
    println!("  Versions: {}", counts.versions);
    println!("  Objects:  {}", counts.objects);
    println!("  Sources:  {}", counts.sources);
    println!("  Symbols:  {}", counts.symbols);
    println!("  Windows:  {}", counts.windows);
    Ok(())
}
