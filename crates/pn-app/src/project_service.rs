//! Plant file loading, saving, validation, and introspection.

use std::collections::BTreeSet;
use std::path::Path;

use pn_project::schema::{BundleDef, FluidDef, Project};

use crate::error::{AppError, AppResult};

/// Summary of a bundle for listing.
#[derive(Debug, Clone)]
pub struct BundleSummary {
    pub name: String,
    pub fluid: Option<FluidDef>,
    pub path_count: usize,
    pub component_count: usize,
    pub closed_paths: usize,
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Load a plant file, YAML or JSON by extension, migrated to the latest
/// version and validated.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let project = if is_json(path) {
        pn_project::parse_json(&content)?
    } else {
        pn_project::parse_yaml(&content)?
    };
    Ok(project)
}

/// Save a plant file; JSON when the extension says so, YAML otherwise.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    pn_project::validate_project(project)?;
    let content = if is_json(path) {
        serde_json::to_string_pretty(project)
            .map_err(|e| AppError::Project(format!("Failed to serialize project: {}", e)))?
    } else {
        serde_yaml::to_string(project)
            .map_err(|e| AppError::Project(format!("Failed to serialize project: {}", e)))?
    };

    std::fs::write(path, content).map_err(|e| AppError::ProjectFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Validate a plant description.
pub fn validate_project(project: &Project) -> AppResult<()> {
    if project.bundles.is_empty() {
        return Err(AppError::Validation(
            "Plant must declare at least one bundle".to_string(),
        ));
    }
    pn_project::validate_project(project)?;
    Ok(())
}

/// List all bundles in the plant with summaries.
pub fn list_bundles(project: &Project) -> Vec<BundleSummary> {
    project.bundles.iter().map(summarize).collect()
}

fn summarize(bundle: &BundleDef) -> BundleSummary {
    let components: BTreeSet<&str> = bundle
        .paths
        .iter()
        .flat_map(|p| p.elements.iter().map(|e| e.component.as_str()))
        .collect();
    BundleSummary {
        name: bundle.name.clone(),
        fluid: bundle.fluid,
        path_count: bundle.paths.len(),
        component_count: components.len(),
        closed_paths: bundle.paths.iter().filter(|p| p.closed).count(),
    }
}

/// Get a specific bundle by name.
pub fn get_bundle<'a>(project: &'a Project, name: &str) -> AppResult<&'a BundleDef> {
    project
        .bundle(name)
        .ok_or_else(|| AppError::BundleNotFound(name.to_string()))
}
