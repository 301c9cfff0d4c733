//! Per-step upstream-pointer propagation.
//!
//! Rewrites every input's effective upstream (`upv`) from the designed wiring
//! and the current output controls. The pass starts from `upv = upo`, so it
//! never depends on what a previous pass left behind.

use pn_core::{InPortId, OutPortId};
use pn_graph::{ControlState, PortGraph};
use tracing::trace;

use crate::path::{JunctionRole, LogicalPath};

/// Run one propagation pass over every path.
pub fn propagate(graph: &mut PortGraph, paths: &mut [LogicalPath]) {
    graph.reset_upstreams();

    for path in paths.iter_mut() {
        sweep(graph, path);
    }

    // Diverge copies leave the unknown set; chained diverges resolve upstream first
    let mut leaders: Vec<&LogicalPath> = paths
        .iter()
        .filter(|p| p.role == JunctionRole::DivergeLeader)
        .collect();
    leaders.sort_by_key(|p| (p.level, p.id));
    for path in leaders {
        bypass_diverge(graph, path);
    }
}

/// Where the running upstream starts.
fn seed(path: &LogicalPath) -> Option<OutPortId> {
    if path.role != JunctionRole::Plain || path.control == ControlState::Batch {
        path.elements.first().and_then(|e| e.output)
    } else if path.closed {
        path.last_output()
    } else {
        None
    }
}

fn sweep(graph: &mut PortGraph, path: &mut LogicalPath) {
    path.virtual_owner = None;
    if path.control.is_off() {
        // No flow: nothing on the path reads an upstream
        for element in &path.elements[path.lead_index()..] {
            set_upv(graph, element.input, None);
        }
        return;
    }
    let mut running = seed(path);

    for index in path.lead_index()..path.elements.len() {
        let element = path.elements[index];
        let Some(output) = element.output else {
            if element.input.is_some() {
                path.virtual_owner = path.virtual_owner.or(Some(index));
                set_upv(graph, element.input, running);
            }
            continue;
        };

        let control = graph.control(output);
        if control.is_off() {
            set_upv(graph, element.input, None);
        } else if control.is_boundary() {
            running = Some(output);
        } else {
            set_upv(graph, element.input, running);
            path.virtual_owner = path.virtual_owner.or(Some(index));
            running = Some(output);
        }
    }
}

/// Turn the junction's branch output off and feed the branch's owner straight
/// from the junction's own upstream.
fn bypass_diverge(graph: &mut PortGraph, path: &LogicalPath) {
    let (Some(junction), Some(head)) = (path.leads_from, path.elements.first()) else {
        return;
    };
    if let Some(output) = head.output {
        graph.set_control(output, ControlState::Off);
    }

    let source = graph
        .input_on_channel(junction, path.channel)
        .and_then(|id| graph.input(id))
        .and_then(|p| p.upv);
    if let Some(owner) = path.virtual_owner.and_then(|i| path.elements.get(i)) {
        set_upv(graph, owner.input, source);
        trace!(path = %path.name, channel = %path.channel, "diverge copy bypassed");
    }
}

fn set_upv(graph: &mut PortGraph, input: Option<InPortId>, upstream: Option<OutPortId>) {
    if let Some(port) = input.and_then(|id| graph.input_mut(id)) {
        port.upv = upstream;
    }
}
