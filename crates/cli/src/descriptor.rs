//! Project descriptor: the YAML document `add-project` ingests.
//!
//! A descriptor names the project, its platform, and the listing documents
//! (disassembler-adapter output) to index, grouped by version. Listing
//! paths are resolved relative to the descriptor file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDescriptor {
    pub name: String,
    #[serde(default)]
    pub repo: Option<String>,
    /// Default platform for every version and object below.
    pub platform: String,
    #[serde(default)]
    pub versions: Vec<VersionDescriptor>,
    /// Version-less sources (e.g. one-off uploads).
    #[serde(default)]
    pub objects: Vec<ObjectDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionDescriptor {
    pub name: String,
    /// Overrides the project platform for this version.
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub objects: Vec<ObjectDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDescriptor {
    pub name: String,
    /// Path to the listing document, relative to the descriptor.
    pub listing: PathBuf,
    /// Optional upstream link recorded on the source.
    #[serde(default)]
    pub link: Option<String>,
}

pub fn load_descriptor(path: &Path) -> Result<ProjectDescriptor> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project descriptor at {}", path.display()))?;
    let descriptor: ProjectDescriptor =
        serde_yaml::from_str(&raw).context("Failed to parse project descriptor YAML")?;
    Ok(descriptor)
}

/// Resolve a listing path against the descriptor's directory.
pub fn resolve_listing_path(descriptor_path: &Path, listing: &Path) -> PathBuf {
    if listing.is_absolute() {
        listing.to_path_buf()
    } else {
        descriptor_path.parent().unwrap_or(Path::new(".")).join(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_descriptor() {
        let raw = "\
name: examplegame
platform: n64
versions:
  - name: us10
    objects:
      - name: main
        listing: build/main.sym.json
";
        let descriptor: ProjectDescriptor = serde_yaml::from_str(raw).expect("parse");
        assert_eq!(descriptor.name, "examplegame");
        assert_eq!(descriptor.versions.len(), 1);
        assert_eq!(descriptor.versions[0].objects[0].name, "main");
        assert!(descriptor.objects.is_empty());
    }

    #[test]
    fn listing_paths_resolve_relative_to_the_descriptor() {
        let resolved = resolve_listing_path(
            Path::new("/work/proj/symhound.yaml"),
            Path::new("build/main.sym.json"),
        );
        assert_eq!(resolved, PathBuf::from("/work/proj/build/main.sym.json"));
    }
}
