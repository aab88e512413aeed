//! `init` and `add-project`: create an index and feed descriptors into it.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use symhound_core::backends;
use symhound_core::db::{IndexConfig, SourceMeta, SourceReceipt, StoreError};
use symhound_core::model::Platform;

use crate::commands::open_index;
use crate::descriptor::{load_descriptor, resolve_listing_path, ObjectDescriptor};

/// Initialize the index database and blob root named by the configuration.
pub fn init_command(config: IndexConfig) -> Result<()> {
    let db = open_index(config)?;
    println!("Initialized symhound index:");
    println!("  Database: {}", db.config().db_path.display());
    println!("  Blob root: {}", db.config().blob_root.display());
    println!("  Window width: {}", db.config().window_width);
    Ok(())
}

/// Ingest a project descriptor: create the project and its versions, then
/// index every listed object as one source each.
pub fn add_project_command(config: IndexConfig, descriptor_path: &str) -> Result<()> {
    let descriptor_path = Path::new(descriptor_path);
    let descriptor = load_descriptor(descriptor_path)?;
    let default_platform = parse_platform(&descriptor.platform)?;

    let mut db = open_index(config)?;

    // Re-running a descriptor with new versions against an existing project
    // is routine, so a name collision resolves to the existing row.
    let project_id = match db.create_project(&descriptor.name, descriptor.repo.as_deref()) {
        Ok(id) => id,
        Err(StoreError::Conflict(_)) => db
            .find_project_by_name(&descriptor.name)?
            .map(|p| p.id)
            .ok_or_else(|| anyhow!("project {:?} vanished during ingest", descriptor.name))?,
        Err(err) => return Err(err.into()),
    };

    let mut sources = 0usize;
    let mut symbols = 0usize;
    let mut windows = 0usize;

    for version in &descriptor.versions {
        let platform = match &version.platform {
            Some(name) => parse_platform(name)?,
            None => default_platform,
        };
        let version_id = db.create_version(project_id, &version.name, platform.to_i32())?;
        println!("Importing version {} ({})", version.name, platform.name());

        for object in &version.objects {
            let receipt = ingest_object(
                &mut db,
                descriptor_path,
                project_id,
                Some(version_id),
                platform,
                object,
            )?;
            report_source(object, &receipt);
            sources += 1;
            symbols += receipt.symbols;
            windows += receipt.windows;
        }
    }

    for object in &descriptor.objects {
        let receipt =
            ingest_object(&mut db, descriptor_path, project_id, None, default_platform, object)?;
        report_source(object, &receipt);
        sources += 1;
        symbols += receipt.symbols;
        windows += receipt.windows;
    }

    println!(
        "Imported project {}: {} sources, {} symbols, {} windows",
        descriptor.name, sources, symbols, windows
    );
    Ok(())
}

fn report_source(object: &ObjectDescriptor, receipt: &SourceReceipt) {
    let dedup = if receipt.object_created { "" } else { " (object deduplicated)" };
    println!(
        "  {} -> source {} [{} symbols, {} windows]{}",
        object.name, receipt.source_slug, receipt.symbols, receipt.windows, dedup
    );
}

fn ingest_object(
    db: &mut symhound_core::db::IndexDb,
    descriptor_path: &Path,
    project_id: i64,
    version_id: Option<i64>,
    platform: Platform,
    object: &ObjectDescriptor,
) -> Result<SourceReceipt> {
    let listing_path = resolve_listing_path(descriptor_path, &object.listing);
    let bytes = std::fs::read(&listing_path)
        .with_context(|| format!("Failed to read listing {}", listing_path.display()))?;
    let document = backends::parse_listing(&bytes)
        .with_context(|| format!("Failed to parse listing {}", listing_path.display()))?;

    log::debug!(
        "ingesting {} ({} symbols) from {}",
        object.name,
        document.symbols.len(),
        listing_path.display()
    );

    let meta = SourceMeta {
        name: object.name.clone(),
        project_id,
        version_id,
        platform: platform.to_i32(),
        source_link: object.link.clone(),
    };
    let receipt = db.insert_source(&meta, &bytes, &document.symbols)?;
    Ok(receipt)
}

fn parse_platform(name: &str) -> Result<Platform> {
    Platform::from_name(name).ok_or_else(|| anyhow!("Unknown platform {name:?}"))
}
