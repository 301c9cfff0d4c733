//! Lowering of a plant description into a port graph and network declaration.

use pn_core::{kgps, unitless};
use pn_graph::{
    Channel, ComponentKind, ControlState, Fluid, GraphBuilder, PortGraph, PortLayout, PortSpec,
};
use pn_network::{
    BundleDecl, ElementDecl, NetworkDecl, PathDecl, Resolution, ResolveOptions, ValveDecl,
};
use pn_project::schema::{
    BundleDef, ChannelDef, ComponentDef, ComponentKindDef, ControlDef, ElementDef, FluidDef,
    PathDef, PortDef, PortsDef, Project, ValveDef,
};

use crate::error::{AppError, AppResult};

/// A plant lowered to what the network layer consumes.
#[derive(Debug)]
pub struct CompiledPlant {
    pub graph: PortGraph,
    pub decl: NetworkDecl,
}

/// Build the port graph and network declaration of a plant.
///
/// Component controls are written onto every output of the component before
/// the network sees the graph.
pub fn compile_plant(project: &Project) -> AppResult<CompiledPlant> {
    let mut builder = GraphBuilder::new();
    let mut controls = Vec::new();

    for component in &project.components {
        let id = add_component(&mut builder, component)?;
        if component.control != ControlDef::On {
            controls.push((id, control(component.control)));
        }
    }

    let mut graph = builder.build()?;
    for (id, state) in controls {
        graph.set_component_control(id, state);
    }

    let decl = NetworkDecl {
        bundles: project
            .bundles
            .iter()
            .map(bundle)
            .collect::<AppResult<_>>()?,
        valves: project.valves.iter().map(valve).collect(),
    };

    Ok(CompiledPlant { graph, decl })
}

/// Compile and resolve a plant in one go.
pub fn resolve_plant(project: &Project, options: ResolveOptions) -> AppResult<Resolution> {
    let CompiledPlant { graph, decl } = compile_plant(project)?;
    let resolution = pn_network::resolve(graph, &decl, options)?;
    Ok(resolution)
}

fn add_component(
    builder: &mut GraphBuilder,
    component: &ComponentDef,
) -> AppResult<pn_core::CompId> {
    let kind = kind(&component.kind);
    let id = match &component.ports {
        Some(ports) => {
            builder.add_component_with_layout(component.name.clone(), kind, layout(ports))?
        }
        None => builder.add_component(component.name.clone(), kind)?,
    };
    Ok(id)
}

fn fluid(def: FluidDef) -> Fluid {
    match def {
        FluidDef::Water => Fluid::Water,
        FluidDef::Air => Fluid::Air,
    }
}

fn channel(def: ChannelDef) -> Channel {
    match def {
        ChannelDef::AirTemperature => Channel::AirTemperature,
        ChannelDef::AirHumidity => Channel::AirHumidity,
        ChannelDef::Water => Channel::Water,
    }
}

fn control(def: ControlDef) -> ControlState {
    match def {
        ControlDef::On => ControlState::On,
        ControlDef::Off => ControlState::Off,
        ControlDef::LoadControlled => ControlState::LoadControlled,
        ControlDef::Bypass => ControlState::Bypass,
        ControlDef::Batch => ControlState::Batch,
    }
}

fn kind(def: &ComponentKindDef) -> ComponentKind {
    match def {
        ComponentKindDef::Boiler => ComponentKind::Boiler,
        ComponentKindDef::Pump { variable_flow } => ComponentKind::Pump {
            variable_flow: *variable_flow,
        },
        ComponentKindDef::Fan { variable_flow } => ComponentKind::Fan {
            variable_flow: *variable_flow,
        },
        ComponentKindDef::Valve { fluid: f } => ComponentKind::Valve { fluid: fluid(*f) },
        ComponentKindDef::Pipe { fluid: f } => ComponentKind::Pipe { fluid: fluid(*f) },
        ComponentKindDef::Diverge { fluid: f, branches } => ComponentKind::Diverge {
            fluid: fluid(*f),
            branches: *branches,
        },
        ComponentKindDef::Converge { fluid: f, branches } => ComponentKind::Converge {
            fluid: fluid(*f),
            branches: *branches,
        },
        ComponentKindDef::Room => ComponentKind::Room,
        ComponentKindDef::Coil => ComponentKind::Coil,
        ComponentKindDef::StorageTank { correspondence } => ComponentKind::StorageTank {
            correspondence: correspondence
                .iter()
                .map(|c| (c.inlet.clone(), c.outlet.clone()))
                .collect(),
        },
        ComponentKindDef::Collector => ComponentKind::Collector,
        ComponentKindDef::DesiccantUnit => ComponentKind::DesiccantUnit,
        ComponentKindDef::EvaporativeCooler => ComponentKind::EvaporativeCooler,
        ComponentKindDef::TotalHeatExchanger => ComponentKind::TotalHeatExchanger,
        ComponentKindDef::RadiantPanel => ComponentKind::RadiantPanel,
        ComponentKindDef::Vav => ComponentKind::Vav,
        ComponentKindDef::Source { fluid: f } => ComponentKind::Source { fluid: fluid(*f) },
        ComponentKindDef::Sink { fluid: f } => ComponentKind::Sink { fluid: fluid(*f) },
    }
}

fn port(def: &PortDef) -> PortSpec {
    PortSpec {
        tag: def.tag.clone(),
        channel: channel(def.channel),
        depends_on: def.depends_on.clone(),
    }
}

fn layout(def: &PortsDef) -> PortLayout {
    PortLayout {
        outputs: def.outputs.iter().map(port).collect(),
        inputs: def.inputs.iter().map(port).collect(),
    }
}

fn bundle(def: &BundleDef) -> AppResult<BundleDecl> {
    let Some(f) = def.fluid else {
        return Err(AppError::Compile(format!(
            "Bundle '{}' has no fluid",
            def.name
        )));
    };
    Ok(BundleDecl {
        name: def.name.clone(),
        fluid: fluid(f),
        paths: def.paths.iter().map(path).collect(),
    })
}

fn path(def: &PathDef) -> PathDecl {
    PathDecl {
        name: def.name.clone(),
        closed: def.closed,
        control: control(def.control),
        flow: def.flow_kg_s.map(kgps),
        elements: def.elements.iter().map(element).collect(),
    }
}

fn element(def: &ElementDef) -> ElementDecl {
    ElementDecl {
        component: def.component.clone(),
        inlet: def.inlet.clone(),
        outlet: def.outlet.clone(),
    }
}

fn valve(def: &ValveDef) -> ValveDecl {
    ValveDecl {
        name: def.name.clone(),
        component: def.component.clone(),
        path_a: def.path_a.clone(),
        path_b: def.path_b.clone(),
        ratio: unitless(def.ratio),
        monitor: def.monitor.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_ports_override_default_layout() {
        let def = PortsDef {
            outputs: vec![PortDef {
                tag: "Wo".to_string(),
                channel: ChannelDef::Water,
                depends_on: vec!["Wi".to_string()],
            }],
            inputs: vec![PortDef {
                tag: "Wi".to_string(),
                channel: ChannelDef::Water,
                depends_on: vec![],
            }],
        };
        let layout = layout(&def);
        assert_eq!(layout.outputs[0].tag, "Wo");
        assert_eq!(layout.outputs[0].depends_on, vec!["Wi".to_string()]);
        assert_eq!(layout.inputs[0].channel, Channel::Water);
    }

    #[test]
    fn bundle_without_fluid_is_a_compile_error() {
        let def = BundleDef {
            name: "HW".to_string(),
            fluid: None,
            paths: vec![],
        };
        assert!(matches!(bundle(&def), Err(AppError::Compile(_))));
    }
}
