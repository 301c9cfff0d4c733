//! Line-oriented dump of resolved bindings and topology.
//!
//! Section headers are written once per [`ReportContext`]; later calls with the
//! same context only append rows.

use std::io::{self, Write};

use pn_core::{OutPortId, as_kgps};
use pn_graph::PortGraph;

use crate::classify::{FlowStatus, KnownBy};
use crate::network::Network;

/// Tracks which section headers a report stream already carries.
#[derive(Debug, Default)]
pub struct ReportContext {
    bindings_header: bool,
    topology_header: bool,
}

impl ReportContext {
    pub fn new() -> Self {
        Self::default()
    }
}

fn upstream_label(graph: &PortGraph, id: Option<OutPortId>) -> String {
    id.map_or_else(|| "-".to_string(), |id| graph.output_label(id))
}

/// Components with their ports, controls and upstream bindings.
pub fn write_bindings<W: Write>(
    ctx: &mut ReportContext,
    out: &mut W,
    graph: &PortGraph,
) -> io::Result<()> {
    if !ctx.bindings_header {
        writeln!(out, "# bindings")?;
        writeln!(out, "{:>4}  {:<12} {:<20}", "idx", "name", "kind")?;
        ctx.bindings_header = true;
    }

    for comp in graph.components() {
        writeln!(
            out,
            "{:>4}  {:<12} {:<20}",
            comp.id.index(),
            comp.name,
            comp.kind.label()
        )?;
        for port in comp.outputs.iter().filter_map(|&id| graph.output(id)) {
            writeln!(
                out,
                "      out {:<4} {} {}",
                port.tag, port.channel, port.control
            )?;
        }
        for port in comp.inputs.iter().filter_map(|&id| graph.input(id)) {
            writeln!(
                out,
                "      in  {:<4} {} upo={} upv={}",
                port.tag,
                port.channel,
                upstream_label(graph, port.upo),
                upstream_label(graph, port.upv)
            )?;
        }
    }
    Ok(())
}

/// Bundles, paths (with role, level and flow status) and junction levels.
pub fn write_topology<W: Write>(
    ctx: &mut ReportContext,
    out: &mut W,
    network: &Network,
) -> io::Result<()> {
    if !ctx.topology_header {
        writeln!(out, "# topology")?;
        ctx.topology_header = true;
    }
    let graph = network.graph();

    for bundle in network.bundles() {
        writeln!(
            out,
            "bundle {} ({}) known={} junctions={} max_level={}",
            bundle.name, bundle.fluid, bundle.known_count, bundle.junction_count, bundle.max_level
        )?;
        for path in bundle.paths.iter().filter_map(|&id| network.path(id)) {
            let status = match (path.status, path.flow) {
                (FlowStatus::Unknown, _) => "unknown".to_string(),
                (FlowStatus::Known(KnownBy::Schedule), Some(flow)) => {
                    format!("known(Schedule) {} kg/s", as_kgps(flow))
                }
                (FlowStatus::Known(by), _) => format!("known({:?})", by),
            };
            writeln!(
                out,
                "  path {} [{}] {:?} level={} {}",
                path.name, path.channel, path.role, path.level, status
            )?;
            let names: Vec<&str> = path
                .elements
                .iter()
                .filter_map(|e| graph.component(e.comp))
                .map(|c| c.name.as_str())
                .collect();
            writeln!(out, "    {}", names.join(" -> "))?;
        }
    }

    for junction in network.junctions() {
        writeln!(
            out,
            "junction {} {:?} level={} in={} out={}",
            junction.name,
            junction.kind,
            junction.level.unwrap_or(0),
            junction.inbound.len(),
            junction.leading.len()
        )?;
    }
    Ok(())
}
