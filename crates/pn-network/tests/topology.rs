//! Assembly, leveling and classification through `resolve`.

mod common;

use common::{branch_plant, converge, diverge, path, pipe, y_plant};
use pn_core::kgps;
use pn_graph::{Channel, ComponentKind, Fluid, GraphBuilder, GraphError, Side};
use pn_network::{
    BalancePolicy, BundleDecl, ElementDecl, FlowStatus, JunctionRole, KnownBy, NetworkDecl,
    NetworkError, NetworkWarning, PathDecl, ResolveOptions, resolve,
};

fn deny() -> ResolveOptions {
    ResolveOptions {
        balance_policy: BalancePolicy::Deny,
    }
}

#[test]
fn y_network_has_one_unknown_and_one_junction() {
    let (graph, decl) = y_plant();
    let resolution = resolve(graph, &decl, deny()).unwrap();
    assert!(resolution.warnings.is_empty());

    let mut network = resolution.network;
    let outlet = network.find_path("OUTLET").unwrap();
    let flows = network.classify();
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0].unknown, vec![outlet]);
    assert_eq!(flows[0].rows.len(), 1);
    assert_eq!(flows[0].check("Y"), None);

    let row = &flows[0].rows[0];
    assert_eq!(row.inbound.len(), 2);
    assert_eq!(row.leading, vec![outlet]);

    let bundle = &network.bundles()[0];
    assert_eq!(bundle.known_count, 2);
    assert_eq!(bundle.junction_count, 1);
    assert_eq!(bundle.max_level, 1);

    let inlet = network.path(network.find_path("IN1").unwrap()).unwrap();
    assert_eq!(inlet.status, FlowStatus::Known(KnownBy::Schedule));
}

#[test]
fn chained_junctions_level_in_order() {
    // A feeds B, B feeds C
    let mut builder = GraphBuilder::new();
    builder
        .add_component("SRC", ComponentKind::Source { fluid: Fluid::Water })
        .unwrap();
    for name in ["P0", "P1", "P1B", "P2", "P2B", "P3"] {
        pipe(&mut builder, name);
    }
    diverge(&mut builder, "A", 2);
    diverge(&mut builder, "B", 2);
    converge(&mut builder, "C", 2);
    for name in ["SNK1", "SNK2"] {
        builder
            .add_component(name, ComponentKind::Sink { fluid: Fluid::Water })
            .unwrap();
    }
    let graph = builder.build().unwrap();

    let decl = NetworkDecl {
        bundles: vec![
            BundleDecl::new("CHAIN", Fluid::Water)
                .path(path("IN", &["SRC", "P0", "A"]))
                .path(path("AB", &["A", "P1", "B"]))
                .path(path("A_OUT", &["A", "P1B", "SNK1"]))
                .path(path("BC1", &["B", "P2", "C"]))
                .path(path("BC2", &["B", "P2B", "C"]))
                .path(path("OUT", &["C", "P3", "SNK2"])),
        ],
        valves: vec![],
    };
    let network = resolve(graph, &decl, ResolveOptions::default())
        .unwrap()
        .network;

    let level = |name: &str| {
        network
            .junctions()
            .iter()
            .find(|j| j.name == name)
            .and_then(|j| j.level)
            .unwrap()
    };
    assert_eq!((level("A"), level("B"), level("C")), (1, 2, 3));
    assert_eq!(network.bundles()[0].max_level, 3);

    let bc1 = network.path(network.find_path("BC1").unwrap()).unwrap();
    assert_eq!(bc1.role, JunctionRole::DivergeLeader);
    assert_eq!(bc1.level, 2);
    let out = network.path(network.find_path("OUT").unwrap()).unwrap();
    assert_eq!(out.role, JunctionRole::ConvergeLeader);
}

#[test]
fn junction_cycle_is_rejected() {
    let mut builder = GraphBuilder::new();
    diverge(&mut builder, "A", 1);
    diverge(&mut builder, "B", 1);
    pipe(&mut builder, "X1");
    pipe(&mut builder, "X2");
    let graph = builder.build().unwrap();

    let decl = NetworkDecl {
        bundles: vec![
            BundleDecl::new("LOOP", Fluid::Water)
                .path(path("AB", &["A", "X1", "B"]))
                .path(path("BA", &["B", "X2", "A"])),
        ],
        valves: vec![],
    };
    let err = resolve(graph, &decl, ResolveOptions::default()).unwrap_err();
    assert_eq!(
        err,
        NetworkError::TopologyCycle {
            junctions: vec!["A".into(), "B".into()]
        }
    );
}

#[test]
fn balanced_branches_with_valve() {
    let (graph, decl) = branch_plant(true);
    let resolution = resolve(graph, &decl, deny()).unwrap();
    let mut network = resolution.network;

    let b = network.find_path("B").unwrap();
    let ret = network.find_path("RETURN").unwrap();
    let flows = network.classify();
    assert_eq!(flows[0].unknown, vec![b, ret]);
    // Diverge rows come before the converge they feed
    let names: Vec<&str> = flows[0]
        .rows
        .iter()
        .map(|r| network.graph().component(r.junction).unwrap().name.as_str())
        .collect();
    assert_eq!(names, vec!["DV", "CV"]);

    let a = network.path(network.find_path("A").unwrap()).unwrap();
    assert_eq!(a.status, FlowStatus::Known(KnownBy::ValveShare));
    let supply = network.path(network.find_path("SUPPLY").unwrap()).unwrap();
    assert_eq!(supply.status, FlowStatus::Known(KnownBy::VariableFlow));
}

#[test]
fn imbalance_warns_or_fails_by_policy() {
    let (graph, decl) = branch_plant(false);
    let resolution = resolve(graph, &decl, ResolveOptions::default()).unwrap();
    assert_eq!(resolution.warnings.len(), 1);
    let NetworkWarning::FlowBalance(mismatch) = &resolution.warnings[0];
    assert_eq!((mismatch.equations, mismatch.unknowns), (2, 3));

    let (graph, decl) = branch_plant(false);
    let err = resolve(graph, &decl, deny()).unwrap_err();
    assert!(matches!(err, NetworkError::FlowBalance(_)));
}

#[test]
fn off_path_is_known_zero() {
    let (graph, decl) = branch_plant(false);
    let mut network = resolve(graph, &decl, ResolveOptions::default())
        .unwrap()
        .network;
    let b = network.find_path("B").unwrap();
    network
        .set_path_control(b, pn_graph::ControlState::Off)
        .unwrap();

    let flows = network.classify();
    assert!(!flows[0].unknown.contains(&b));
    assert!(flows[0].known.contains(&b));
    assert_eq!(flows[0].check("HW"), None);

    // The solver sees the same: nothing on B is solved for or read upstream
    let step = network.step().unwrap();
    let path_b = network.path(b).unwrap();
    let vb = path_b.elements[1];
    assert_eq!(step.equations.unknown_index(vb.output.unwrap()), None);
    let graph = network.graph();
    assert_eq!(graph.input(vb.input.unwrap()).unwrap().upv, None);
    let cv_inlet = path_b.elements[2].input.unwrap();
    assert_eq!(graph.input(cv_inlet).unwrap().upv, None);

    network
        .set_path_control(b, pn_graph::ControlState::On)
        .unwrap();
    let step = network.step().unwrap();
    assert!(step.equations.unknown_index(vb.output.unwrap()).is_some());
}

#[test]
fn diverge_leading_two_unknown_branches_counts_once() {
    let mut builder = GraphBuilder::new();
    builder
        .add_component("SRC", ComponentKind::Source { fluid: Fluid::Water })
        .unwrap();
    for name in ["P0", "PA", "PB"] {
        pipe(&mut builder, name);
    }
    diverge(&mut builder, "DV", 2);
    for name in ["SNK1", "SNK2"] {
        builder
            .add_component(name, ComponentKind::Sink { fluid: Fluid::Water })
            .unwrap();
    }
    let graph = builder.build().unwrap();

    let decl = NetworkDecl {
        bundles: vec![
            BundleDecl::new("SPLIT", Fluid::Water)
                .path(path("IN", &["SRC", "P0", "DV"]).with_flow(kgps(1.0)))
                .path(path("A", &["DV", "PA", "SNK1"]))
                .path(path("B", &["DV", "PB", "SNK2"])),
        ],
        valves: vec![],
    };
    let resolution = resolve(graph, &decl, ResolveOptions::default()).unwrap();
    assert_eq!(resolution.warnings.len(), 1);
    let NetworkWarning::FlowBalance(mismatch) = &resolution.warnings[0];
    assert_eq!((mismatch.equations, mismatch.unknowns), (1, 2));
}

#[test]
fn unknown_names_are_reported() {
    let (graph, mut decl) = y_plant();
    decl.bundles[0]
        .paths
        .push(path("GHOST", &["S1", "NOPE"]));
    let err = resolve(graph, &decl, ResolveOptions::default()).unwrap_err();
    assert_eq!(
        err,
        NetworkError::Graph(GraphError::UnknownComponent {
            name: "NOPE".into()
        })
    );

    let (graph, mut decl) = y_plant();
    decl.bundles[0].paths.push(path("IN1", &["S1"]));
    let err = resolve(graph, &decl, ResolveOptions::default()).unwrap_err();
    assert_eq!(err, NetworkError::DuplicatePath { name: "IN1".into() });

    let (graph, mut decl) = y_plant();
    decl.bundles[0].paths.push(PathDecl::new("EMPTY", vec![]));
    let err = resolve(graph, &decl, ResolveOptions::default()).unwrap_err();
    assert_eq!(err, NetworkError::EmptyPath { path: "EMPTY".into() });
}

#[test]
fn bad_port_request_fails_resolution() {
    let mut builder = GraphBuilder::new();
    builder
        .add_component("S", ComponentKind::Source { fluid: Fluid::Water })
        .unwrap();
    builder.add_component("ROOM", ComponentKind::Room).unwrap();
    let graph = builder.build().unwrap();

    let decl = NetworkDecl {
        bundles: vec![BundleDecl::new("W", Fluid::Water).path(PathDecl::new(
            "P",
            vec![ElementDecl::new("S"), ElementDecl::new("ROOM").outlet("Q")],
        ))],
        valves: vec![],
    };
    let err = resolve(graph, &decl, ResolveOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Graph(GraphError::PortResolution { .. })
    ));
}

#[test]
fn component_without_the_bundle_fluid_is_rejected() {
    let mut builder = GraphBuilder::new();
    builder
        .add_component("S", ComponentKind::Source { fluid: Fluid::Water })
        .unwrap();
    builder.add_component("ROOM", ComponentKind::Room).unwrap();
    pipe(&mut builder, "P");
    let graph = builder.build().unwrap();

    let decl = NetworkDecl {
        bundles: vec![BundleDecl::new("W", Fluid::Water).path(path("P", &["S", "ROOM", "P"]))],
        valves: vec![],
    };
    let err = resolve(graph, &decl, ResolveOptions::default()).unwrap_err();
    assert_eq!(
        err,
        NetworkError::Graph(GraphError::PortResolution {
            component: "ROOM".into(),
            requested: "<default>".into(),
            side: Side::Input,
            channel: Channel::Water,
        })
    );
}

#[test]
fn water_component_in_air_path_is_rejected() {
    let mut builder = GraphBuilder::new();
    builder
        .add_component("OA", ComponentKind::Source { fluid: Fluid::Air })
        .unwrap();
    builder.add_component("BOI", ComponentKind::Boiler).unwrap();
    builder
        .add_component("EA", ComponentKind::Sink { fluid: Fluid::Air })
        .unwrap();
    let graph = builder.build().unwrap();

    let decl = NetworkDecl {
        bundles: vec![BundleDecl::new("AHU", Fluid::Air).path(PathDecl::new(
            "SUPPLY",
            vec![
                ElementDecl::new("OA"),
                ElementDecl::new("BOI").inlet("t").outlet("t"),
                ElementDecl::new("EA"),
            ],
        ))],
        valves: vec![],
    };
    let err = resolve(graph, &decl, ResolveOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Graph(GraphError::PortResolution {
            channel: Channel::AirTemperature,
            ..
        })
    ));
}

#[test]
fn air_paths_expand_into_twins() {
    let mut builder = GraphBuilder::new();
    builder
        .add_component("OA", ComponentKind::Source { fluid: Fluid::Air })
        .unwrap();
    builder
        .add_component("FAN", ComponentKind::Fan { variable_flow: false })
        .unwrap();
    builder.add_component("ROOM", ComponentKind::Room).unwrap();
    builder
        .add_component("EA", ComponentKind::Sink { fluid: Fluid::Air })
        .unwrap();
    let graph = builder.build().unwrap();

    let decl = NetworkDecl {
        bundles: vec![BundleDecl::new("AHU", Fluid::Air).path(PathDecl::new(
            "SUPPLY",
            vec![
                ElementDecl::new("OA"),
                ElementDecl::new("FAN"),
                ElementDecl::new("ROOM").inlet("t").outlet("t"),
                ElementDecl::new("EA"),
            ],
        ))],
        valves: vec![],
    };
    let mut network = resolve(graph, &decl, ResolveOptions::default())
        .unwrap()
        .network;
    assert_eq!(network.paths().len(), 2);

    let t_path = network.find_path("SUPPLY").unwrap();
    let twins: Vec<_> = network.twins(t_path).map(|p| (p.id, p.channel)).collect();
    assert_eq!(twins.len(), 2);
    let x_path = network.path(twins[1].0).unwrap();
    assert_eq!(x_path.flow_owner, t_path);
    assert!(!x_path.owns_flow());

    // The fan is transparent on humidity
    assert_eq!(x_path.elements[1].input, None);
    assert_eq!(x_path.elements[1].output, None);

    let graph = network.graph();
    let room_x_in = x_path.elements[2].input.unwrap();
    assert_eq!(graph.input(room_x_in).unwrap().tag, "x");
    assert_eq!(
        graph.input(room_x_in).unwrap().upv,
        x_path.elements[0].output
    );

    // One flow unknown for both channels
    let flows = network.classify();
    assert_eq!(flows[0].unknown, vec![t_path]);
}
