//! Path assembly: bind declared elements to ports and wire designed upstreams.

use std::collections::{BTreeMap, HashMap};

use pn_core::{BundleId, CompId, PathId, ValveId, as_fraction, ensure_fraction, unitless};
use pn_graph::{Channel, PortGraph, PortMatcher, PortQuery, Side};
use tracing::debug;

use crate::classify::FlowStatus;
use crate::decl::{NetworkDecl, PathDecl, ValveDecl};
use crate::error::{NetworkError, NetworkResult};
use crate::path::{Bundle, Junction, JunctionRole, LogicalPath, PathElement, Valve};

/// Everything assembly produces, before leveling and classification.
#[derive(Debug)]
pub(crate) struct Assembly {
    pub paths: Vec<LogicalPath>,
    pub bundles: Vec<Bundle>,
    pub valves: Vec<Valve>,
    pub junctions: Vec<Junction>,
    /// Declared path name to its flow-owning logical path.
    pub by_name: HashMap<String, PathId>,
}

pub(crate) fn assemble(graph: &mut PortGraph, decl: &NetworkDecl) -> NetworkResult<Assembly> {
    // One matcher for the whole network: junction branches stay claimed across paths
    let mut matcher = PortMatcher::new();
    let mut paths: Vec<LogicalPath> = Vec::new();
    let mut bundles = Vec::with_capacity(decl.bundles.len());
    let mut by_name = HashMap::new();

    for (b, bundle_decl) in decl.bundles.iter().enumerate() {
        let bundle_id = BundleId::from_usize(b);
        let mut members = Vec::new();

        for path_decl in &bundle_decl.paths {
            if by_name.contains_key(&path_decl.name) {
                return Err(NetworkError::DuplicatePath {
                    name: path_decl.name.clone(),
                });
            }
            let comps = lookup_components(graph, path_decl)?;
            let (leads_from, ends_at) = junction_ends(graph, path_decl, &comps)?;
            let role = leads_from
                .and_then(|c| graph.component(c))
                .and_then(|c| c.kind.junction())
                .map_or(JunctionRole::Plain, JunctionRole::from_kind);

            let mut owner = None;
            for &channel in bundle_decl.fluid.channels() {
                let id = PathId::from_usize(paths.len());
                let elements = bind_elements(graph, &mut matcher, path_decl, &comps, channel)?;
                let flow_owner = *owner.get_or_insert(id);
                paths.push(LogicalPath {
                    id,
                    name: path_decl.name.clone(),
                    bundle: bundle_id,
                    channel,
                    elements,
                    closed: path_decl.closed,
                    control: path_decl.control,
                    flow: path_decl.flow,
                    flow_owner,
                    role,
                    leads_from,
                    ends_at,
                    level: 0,
                    valve: None,
                    virtual_owner: None,
                    status: FlowStatus::Unknown,
                });
                members.push(id);
            }
            if let Some(owner) = owner {
                by_name.insert(path_decl.name.clone(), owner);
            }
        }

        bundles.push(Bundle {
            id: bundle_id,
            name: bundle_decl.name.clone(),
            fluid: bundle_decl.fluid,
            paths: members,
            known_count: 0,
            junction_count: 0,
            max_level: 0,
        });
    }

    wire_designed_upstreams(graph, &paths);
    let valves = resolve_valves(graph, &decl.valves, &by_name, &mut paths)?;
    let junctions = collect_junctions(graph, &paths);

    debug!(
        bundles = bundles.len(),
        paths = paths.len(),
        valves = valves.len(),
        junctions = junctions.len(),
        claimed = matcher.claimed(),
        "network assembled"
    );

    Ok(Assembly {
        paths,
        bundles,
        valves,
        junctions,
        by_name,
    })
}

fn lookup_components(graph: &PortGraph, decl: &PathDecl) -> NetworkResult<Vec<CompId>> {
    if decl.elements.is_empty() {
        return Err(NetworkError::EmptyPath {
            path: decl.name.clone(),
        });
    }
    let comps = decl
        .elements
        .iter()
        .map(|e| graph.find(&e.component))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comps)
}

/// Junctions may only open or close a path. Returns the junction the path
/// starts at and the one it ends at.
fn junction_ends(
    graph: &PortGraph,
    decl: &PathDecl,
    comps: &[CompId],
) -> NetworkResult<(Option<CompId>, Option<CompId>)> {
    let last = comps.len() - 1;
    let is_junction = |c: CompId| graph.component(c).is_some_and(|c| c.kind.is_junction());

    for (i, &comp) in comps.iter().enumerate() {
        let at_end = (i == 0 || i == last) && comps.len() > 1;
        if is_junction(comp) && !at_end {
            return Err(NetworkError::JunctionPlacement {
                path: decl.name.clone(),
                component: decl.elements[i].component.clone(),
            });
        }
    }

    let leads_from = Some(comps[0]).filter(|&c| is_junction(c));
    let ends_at = Some(comps[last]).filter(|&c| is_junction(c));
    Ok((leads_from, ends_at))
}

fn bind_elements(
    graph: &PortGraph,
    matcher: &mut PortMatcher,
    decl: &PathDecl,
    comps: &[CompId],
    channel: Channel,
) -> NetworkResult<Vec<PathElement>> {
    let last = comps.len() - 1;
    let mut elements = Vec::with_capacity(comps.len());

    for (i, (element, &comp)) in decl.elements.iter().zip(comps).enumerate() {
        let is_junction = graph.component(comp).is_some_and(|c| c.kind.is_junction());

        // A leading junction faces the path with its outlet only, a closing one with its inlet
        let input = if is_junction && i == 0 {
            None
        } else {
            let requested = request_for(graph, comp, Side::Input, element.inlet.as_deref(), channel);
            let query = PortQuery::input(requested.as_deref(), channel);
            matcher.resolve(graph, comp, &query)?.port()
        };

        let output = if is_junction && i == last {
            None
        } else {
            let bound_input = input
                .and_then(|id| graph.input(id))
                .map(|p| p.tag.as_str());
            let requested =
                request_for(graph, comp, Side::Output, element.outlet.as_deref(), channel);
            let query = PortQuery::output(requested.as_deref(), channel, bound_input);
            matcher.resolve(graph, comp, &query)?.port()
        };

        elements.push(PathElement {
            comp,
            input,
            output,
        });
    }

    Ok(elements)
}

/// Port requests are written for the primary channel. The humidity twin asks
/// for the humidity counterpart, or for nothing where the component has no
/// humidity port on that side.
fn request_for(
    graph: &PortGraph,
    comp: CompId,
    side: Side,
    requested: Option<&str>,
    channel: Channel,
) -> Option<String> {
    let requested = requested?;
    if channel.is_primary() {
        return Some(requested.to_string());
    }

    let component = graph.component(comp)?;
    let has_channel = match side {
        Side::Input => component
            .inputs
            .iter()
            .any(|&id| graph.input(id).is_some_and(|p| p.channel == channel)),
        Side::Output => component
            .outputs
            .iter()
            .any(|&id| graph.output(id).is_some_and(|p| p.channel == channel)),
    };
    has_channel.then(|| humidity_tag(requested))
}

fn humidity_tag(tag: &str) -> String {
    if tag == Channel::AirTemperature.default_tag() {
        Channel::AirHumidity.default_tag().to_string()
    } else {
        tag.to_ascii_lowercase()
    }
}

/// Write `Upo` (and the initial `Upv`) of every bound input: each element is
/// fed by the nearest preceding element with an output; a closed path's first
/// element is fed by its last.
fn wire_designed_upstreams(graph: &mut PortGraph, paths: &[LogicalPath]) {
    for path in paths {
        let mut upstream = if path.closed { path.last_output() } else { None };
        for element in &path.elements {
            if let Some(input) = element.input
                && let Some(port) = graph.input_mut(input)
            {
                port.upo = upstream;
                port.upv = upstream;
            }
            if let Some(output) = element.output {
                if let Some(port) = graph.output_mut(output) {
                    port.path = Some(path.id);
                }
                upstream = Some(output);
            }
        }
    }
}

fn resolve_valves(
    graph: &PortGraph,
    decls: &[ValveDecl],
    by_name: &HashMap<String, PathId>,
    paths: &mut [LogicalPath],
) -> NetworkResult<Vec<Valve>> {
    let lookup = |name: &str| {
        by_name
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownPath {
                name: name.to_string(),
            })
    };

    let mut valves = Vec::with_capacity(decls.len());
    for (i, decl) in decls.iter().enumerate() {
        let id = ValveId::from_usize(i);
        let a = lookup(&decl.path_a)?;
        let b = lookup(&decl.path_b)?;
        if a == b {
            return Err(NetworkError::ValveArity {
                valve: decl.name.clone(),
            });
        }
        let component = decl
            .component
            .as_deref()
            .map(|name| graph.find(name))
            .transpose()?;
        let monitor = decl.monitor.as_deref().map(lookup).transpose()?;
        let ratio = ensure_fraction(as_fraction(decl.ratio), "valve ratio")?;

        for path in paths
            .iter_mut()
            .filter(|p| p.flow_owner == a || p.flow_owner == b)
        {
            path.valve = Some(id);
        }
        valves.push(Valve {
            id,
            name: decl.name.clone(),
            component,
            paths: [a, b],
            ratio: unitless(ratio),
            monitor,
        });
    }
    Ok(valves)
}

/// Junctions in component order, with the paths ending at and starting from each.
fn collect_junctions(graph: &PortGraph, paths: &[LogicalPath]) -> Vec<Junction> {
    let mut by_comp: BTreeMap<CompId, Junction> = BTreeMap::new();

    for path in paths {
        for (comp, leading) in [(path.leads_from, true), (path.ends_at, false)] {
            let Some(comp) = comp else { continue };
            let Some(component) = graph.component(comp) else {
                continue;
            };
            let Some(kind) = component.kind.junction() else {
                continue;
            };
            let junction = by_comp.entry(comp).or_insert_with(|| Junction {
                comp,
                name: component.name.clone(),
                kind,
                bundle: path.bundle,
                inbound: Vec::new(),
                leading: Vec::new(),
                level: None,
            });
            if leading {
                junction.leading.push(path.id);
            } else {
                junction.inbound.push(path.id);
            }
        }
    }

    by_comp.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{BundleDecl, ElementDecl};
    use pn_graph::{ComponentKind, Fluid, GraphBuilder};

    #[test]
    fn humidity_requests() {
        assert_eq!(humidity_tag("t"), "x");
        assert_eq!(humidity_tag("D"), "d");
        assert_eq!(humidity_tag("*"), "*");
    }

    #[test]
    fn closed_loop_feeds_first_element_from_last() {
        let mut builder = GraphBuilder::new();
        builder.add_component("BOI", ComponentKind::Boiler).unwrap();
        builder
            .add_component("PU", ComponentKind::Pump { variable_flow: false })
            .unwrap();
        let mut graph = builder.build().unwrap();

        let decl = NetworkDecl {
            bundles: vec![BundleDecl::new("HW", Fluid::Water).path(
                PathDecl::new("LOOP", vec![ElementDecl::new("BOI"), ElementDecl::new("PU")])
                    .closed(),
            )],
            valves: vec![],
        };
        let assembly = assemble(&mut graph, &decl).unwrap();
        let path = &assembly.paths[0];
        let boi = path.elements[0];
        let pu = path.elements[1];

        assert_eq!(graph.input(boi.input.unwrap()).unwrap().upo, pu.output);
        assert_eq!(graph.input(pu.input.unwrap()).unwrap().upo, boi.output);
        assert_eq!(graph.output(pu.output.unwrap()).unwrap().path, Some(path.id));
    }

    #[test]
    fn junction_mid_path_rejected() {
        let mut builder = GraphBuilder::new();
        builder.add_component("P1", ComponentKind::Pipe { fluid: Fluid::Water }).unwrap();
        builder
            .add_component(
                "DV",
                ComponentKind::Diverge {
                    fluid: Fluid::Water,
                    branches: 2,
                },
            )
            .unwrap();
        builder.add_component("P2", ComponentKind::Pipe { fluid: Fluid::Water }).unwrap();
        let mut graph = builder.build().unwrap();

        let decl = NetworkDecl {
            bundles: vec![BundleDecl::new("HW", Fluid::Water).path(PathDecl::new(
                "BAD",
                vec![
                    ElementDecl::new("P1"),
                    ElementDecl::new("DV"),
                    ElementDecl::new("P2"),
                ],
            ))],
            valves: vec![],
        };
        let err = assemble(&mut graph, &decl).unwrap_err();
        assert_eq!(
            err,
            NetworkError::JunctionPlacement {
                path: "BAD".into(),
                component: "DV".into()
            }
        );
    }
}
