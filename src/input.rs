//! Input file loading.
//!
//! Projects and comment collections are supplied by the caller as JSON
//! files (camelCase field names, matching the upstream export format).

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::models::{Comment, Project};

/// Load a project definition from a JSON file.
pub fn load_project(path: &Path) -> Result<Project> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project file: {}", path.display()))?;

    let project: Project = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse project file: {}", path.display()))?;

    info!(
        "Loaded project '{}' with {} questions",
        project.name,
        project.questions.len()
    );
    Ok(project)
}

/// Load the comment collection from a JSON file (a top-level array).
pub fn load_comments(path: &Path) -> Result<Vec<Comment>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read comments file: {}", path.display()))?;

    let comments: Vec<Comment> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse comments file: {}", path.display()))?;

    info!("Loaded {} comments", comments.len());
    Ok(comments)
}
