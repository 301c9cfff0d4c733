//! Plant fixtures shared by the integration tests.
#![allow(dead_code)]

use pn_core::{kgps, unitless};
use pn_graph::{ComponentKind, Fluid, GraphBuilder, PortGraph};
use pn_network::{BundleDecl, ElementDecl, NetworkDecl, PathDecl, ValveDecl};

pub fn pipe(builder: &mut GraphBuilder, name: &str) {
    builder
        .add_component(name, ComponentKind::Pipe { fluid: Fluid::Water })
        .unwrap();
}

pub fn diverge(builder: &mut GraphBuilder, name: &str, branches: u8) {
    builder
        .add_component(
            name,
            ComponentKind::Diverge {
                fluid: Fluid::Water,
                branches,
            },
        )
        .unwrap();
}

pub fn converge(builder: &mut GraphBuilder, name: &str, branches: u8) {
    builder
        .add_component(
            name,
            ComponentKind::Converge {
                fluid: Fluid::Water,
                branches,
            },
        )
        .unwrap();
}

pub fn path(name: &str, elements: &[&str]) -> PathDecl {
    PathDecl::new(name, elements.iter().map(|e| ElementDecl::new(*e)).collect())
}

/// Two sources merging into one outlet ("Y"); both inlets carry scheduled flows.
pub fn y_plant() -> (PortGraph, NetworkDecl) {
    let mut builder = GraphBuilder::new();
    for name in ["S1", "S2"] {
        builder
            .add_component(name, ComponentKind::Source { fluid: Fluid::Water })
            .unwrap();
    }
    pipe(&mut builder, "P1");
    pipe(&mut builder, "P2");
    pipe(&mut builder, "P3");
    converge(&mut builder, "CV", 2);
    builder
        .add_component("OUT", ComponentKind::Sink { fluid: Fluid::Water })
        .unwrap();

    let decl = NetworkDecl {
        bundles: vec![
            BundleDecl::new("Y", Fluid::Water)
                .path(path("IN1", &["S1", "P1", "CV"]).with_flow(kgps(0.4)))
                .path(path("IN2", &["S2", "P2", "CV"]).with_flow(kgps(0.6)))
                .path(path("OUTLET", &["CV", "P3", "OUT"])),
        ],
        valves: vec![],
    };
    (builder.build().unwrap(), decl)
}

/// Boiler and variable-flow pump feeding a diverge; two valved branches merge
/// again and return through a pipe.
pub fn branch_plant(with_valve: bool) -> (PortGraph, NetworkDecl) {
    let mut builder = GraphBuilder::new();
    builder.add_component("BOI", ComponentKind::Boiler).unwrap();
    builder
        .add_component("PU", ComponentKind::Pump { variable_flow: true })
        .unwrap();
    diverge(&mut builder, "DV", 2);
    pipe(&mut builder, "VA");
    pipe(&mut builder, "VB");
    converge(&mut builder, "CV", 2);
    pipe(&mut builder, "RET");
    builder
        .add_component("DRAIN", ComponentKind::Sink { fluid: Fluid::Water })
        .unwrap();

    let valves = if with_valve {
        vec![ValveDecl {
            name: "V1".into(),
            component: None,
            path_a: "A".into(),
            path_b: "B".into(),
            ratio: unitless(0.7),
            monitor: None,
        }]
    } else {
        vec![]
    };
    let decl = NetworkDecl {
        bundles: vec![
            BundleDecl::new("HW", Fluid::Water)
                .path(path("SUPPLY", &["BOI", "PU", "DV"]))
                .path(path("A", &["DV", "VA", "CV"]))
                .path(path("B", &["DV", "VB", "CV"]))
                .path(path("RETURN", &["CV", "RET", "DRAIN"])),
        ],
        valves,
    };
    (builder.build().unwrap(), decl)
}
