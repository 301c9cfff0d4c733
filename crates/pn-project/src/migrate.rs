//! Schema migration framework.

use crate::ProjectError;
use crate::schema::{FluidDef, Project};

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut project: Project) -> Result<Project, ProjectError> {
    while project.version < LATEST_VERSION {
        project = migrate_one_version(project)?;
    }
    Ok(project)
}

fn migrate_one_version(project: Project) -> Result<Project, ProjectError> {
    match project.version {
        0 => migrate_v0_to_v1(project),
        1 => migrate_v1_to_v2(project),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v0_to_v1(mut project: Project) -> Result<Project, ProjectError> {
    project.version = 1;
    Ok(project)
}

/// Version 1 plant files only knew water bundles and left the fluid implicit.
fn migrate_v1_to_v2(mut project: Project) -> Result<Project, ProjectError> {
    for bundle in &mut project.bundles {
        if bundle.fluid.is_none() {
            bundle.fluid = Some(FluidDef::Water);
        }
    }
    project.version = 2;
    Ok(project)
}
