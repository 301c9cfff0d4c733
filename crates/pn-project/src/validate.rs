//! Plant file validation logic.
//!
//! Catches what can be checked without building the port graph: names,
//! references, value ranges and fluid consistency. Port matching and junction
//! leveling are checked when the network is resolved.

use crate::schema::{BundleDef, ComponentDef, FluidDef, PathDef, Project, ValveDef};
use std::collections::{HashMap, HashSet};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Missing reference: {name} in {context}")]
    MissingReference { name: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut components: HashMap<&str, &ComponentDef> = HashMap::new();
    for component in &project.components {
        if components
            .insert(component.name.as_str(), component)
            .is_some()
        {
            return Err(ValidationError::DuplicateName {
                name: component.name.clone(),
                context: "components".to_string(),
            });
        }
        validate_component(component)?;
    }

    let mut bundle_names = HashSet::new();
    let mut path_names = HashSet::new();
    for bundle in &project.bundles {
        if !bundle_names.insert(bundle.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: bundle.name.clone(),
                context: "bundles".to_string(),
            });
        }
        for path in &bundle.paths {
            if !path_names.insert(path.name.as_str()) {
                return Err(ValidationError::DuplicateName {
                    name: path.name.clone(),
                    context: format!("bundle '{}' paths", bundle.name),
                });
            }
        }
        validate_bundle(bundle, &components)?;
    }

    let mut valve_names = HashSet::new();
    for valve in &project.valves {
        if !valve_names.insert(valve.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: valve.name.clone(),
                context: "valves".to_string(),
            });
        }
        validate_valve(valve, &components, &path_names)?;
    }

    Ok(())
}

fn validate_component(component: &ComponentDef) -> Result<(), ValidationError> {
    use crate::schema::ComponentKindDef;

    match &component.kind {
        ComponentKindDef::Diverge { branches, .. } | ComponentKindDef::Converge { branches, .. } => {
            if *branches == 0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("component '{}' branches", component.name),
                    value: branches.to_string(),
                    reason: "a junction needs at least one branch".to_string(),
                });
            }
        }
        ComponentKindDef::StorageTank { correspondence } => {
            if correspondence.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: format!("component '{}' correspondence", component.name),
                    value: "[]".to_string(),
                    reason: "a storage tank needs at least one inlet/outlet pair".to_string(),
                });
            }
        }
        _ => {}
    }

    if let Some(ports) = &component.ports {
        let inputs: HashSet<&str> = ports.inputs.iter().map(|p| p.tag.as_str()).collect();
        for output in &ports.outputs {
            for tag in &output.depends_on {
                if !inputs.contains(tag.as_str()) {
                    return Err(ValidationError::MissingReference {
                        name: tag.clone(),
                        context: format!(
                            "component '{}' output '{}' depends_on",
                            component.name, output.tag
                        ),
                    });
                }
            }
        }
    }

    Ok(())
}

fn validate_bundle(
    bundle: &BundleDef,
    components: &HashMap<&str, &ComponentDef>,
) -> Result<(), ValidationError> {
    let Some(fluid) = bundle.fluid else {
        return Err(ValidationError::InvalidValue {
            field: format!("bundle '{}' fluid", bundle.name),
            value: "none".to_string(),
            reason: "required from version 2".to_string(),
        });
    };

    for path in &bundle.paths {
        validate_path(path, fluid, components)?;
    }
    Ok(())
}

fn validate_path(
    path: &PathDef,
    fluid: FluidDef,
    components: &HashMap<&str, &ComponentDef>,
) -> Result<(), ValidationError> {
    if path.elements.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("path '{}' elements", path.name),
            value: "[]".to_string(),
            reason: "a path needs at least one element".to_string(),
        });
    }

    if let Some(flow) = path.flow_kg_s
        && (!flow.is_finite() || flow < 0.0)
    {
        return Err(ValidationError::InvalidValue {
            field: format!("path '{}' flow_kg_s", path.name),
            value: flow.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }

    let last = path.elements.len() - 1;
    for (i, element) in path.elements.iter().enumerate() {
        let Some(component) = components.get(element.component.as_str()) else {
            return Err(ValidationError::MissingReference {
                name: element.component.clone(),
                context: format!("path '{}' elements", path.name),
            });
        };

        if let Some(own) = component.kind.fluid()
            && own != fluid
        {
            return Err(ValidationError::InvalidValue {
                field: format!("path '{}' element '{}'", path.name, component.name),
                value: format!("{:?}", own),
                reason: format!("component fluid does not match bundle fluid {:?}", fluid),
            });
        }

        if component.kind.is_junction() && ((i != 0 && i != last) || last == 0) {
            return Err(ValidationError::InvalidValue {
                field: format!("path '{}' element '{}'", path.name, component.name),
                value: i.to_string(),
                reason: "junctions may only start or end a path".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_valve(
    valve: &ValveDef,
    components: &HashMap<&str, &ComponentDef>,
    path_names: &HashSet<&str>,
) -> Result<(), ValidationError> {
    let paths = [Some(&valve.path_a), Some(&valve.path_b), valve.monitor.as_ref()];
    for name in paths.into_iter().flatten() {
        if !path_names.contains(name.as_str()) {
            return Err(ValidationError::MissingReference {
                name: name.clone(),
                context: format!("valve '{}'", valve.name),
            });
        }
    }

    if valve.path_a == valve.path_b {
        return Err(ValidationError::InvalidValue {
            field: format!("valve '{}' path_b", valve.name),
            value: valve.path_b.clone(),
            reason: "a valve pairs two distinct paths".to_string(),
        });
    }

    if let Some(component) = &valve.component
        && !components.contains_key(component.as_str())
    {
        return Err(ValidationError::MissingReference {
            name: component.clone(),
            context: format!("valve '{}' component", valve.name),
        });
    }

    if !valve.ratio.is_finite() || !(0.0..=1.0).contains(&valve.ratio) {
        return Err(ValidationError::InvalidValue {
            field: format!("valve '{}' ratio", valve.name),
            value: valve.ratio.to_string(),
            reason: "must be within [0, 1]".to_string(),
        });
    }

    Ok(())
}
