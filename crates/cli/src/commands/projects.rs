//! Project listing and deletion.

use anyhow::{anyhow, Context, Result};
use symhound_core::db::IndexConfig;
use symhound_core::model::Platform;

use crate::commands::open_index;

/// List all projects (human or JSON).
pub fn projects_command(config: IndexConfig, json: bool) -> Result<()> {
    let db = open_index(config)?;
    let projects = db.list_projects().context("Failed to list projects")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects in the index");
        return Ok(());
    }
    for project in projects {
        match &project.repo {
            Some(repo) => println!("{} - {} ({})", project.id, project.name, repo),
            None => println!("{} - {}", project.id, project.name),
        }
        for version in db.versions_for_project(project.id)? {
            let platform = Platform::from_i32(version.platform)
                .map(|p| p.name())
                .unwrap_or("unknown");
            println!("    {} [{}]", version.name, platform);
        }
    }
    Ok(())
}

/// Delete a project by name, cascading to its versions, sources, symbols,
/// and windows.
pub fn delete_project_command(config: IndexConfig, name: &str) -> Result<()> {
    let db = open_index(config)?;
    let project = db
        .find_project_by_name(name)?
        .ok_or_else(|| anyhow!("No project named {name:?}"))?;
    db.delete_project(project.id)?;
    println!("Deleted project {name}");
    Ok(())
}
