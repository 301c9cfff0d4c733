//! Known/unknown flow classification and junction balance collection.

use std::fmt;

use pn_core::{BundleId, CompId, PathId};
use pn_graph::{FlowSetter, PortGraph};

use crate::path::{Bundle, Junction, LogicalPath, Valve};

/// Why a path's flow does not need solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownBy {
    Schedule,
    ValveShare,
    VariableVolume,
    VariableFlow,
    /// Path or its leading output is OFF: zero flow.
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowStatus {
    #[default]
    Unknown,
    Known(KnownBy),
}

impl FlowStatus {
    pub fn is_known(self) -> bool {
        matches!(self, FlowStatus::Known(_))
    }
}

/// Junction equations and unknown flows disagree in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowBalanceMismatch {
    pub bundle: String,
    pub equations: usize,
    pub unknowns: usize,
}

impl fmt::Display for FlowBalanceMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bundle '{}' has {} junction equations for {} unknown flows",
            self.bundle, self.equations, self.unknowns
        )
    }
}

/// Mass balance at one junction, over flow-owning paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub junction: CompId,
    pub level: u32,
    pub inbound: Vec<PathId>,
    pub leading: Vec<PathId>,
}

/// Classification of one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFlows {
    pub bundle: BundleId,
    pub known: Vec<PathId>,
    /// Unknown-flow paths, in declaration order.
    pub unknown: Vec<PathId>,
    /// One row per counted junction, by ascending level.
    pub rows: Vec<BalanceRow>,
}

impl BundleFlows {
    pub fn unknown_count(&self) -> usize {
        self.unknown.len()
    }

    /// With junctions present, every unknown flow needs exactly one junction
    /// equation (the legacy one-based counter form reads `counter - 1 == unknowns`).
    pub fn check(&self, bundle: &str) -> Option<FlowBalanceMismatch> {
        if self.rows.is_empty() || self.rows.len() == self.unknown.len() {
            return None;
        }
        Some(FlowBalanceMismatch {
            bundle: bundle.to_string(),
            equations: self.rows.len(),
            unknowns: self.unknown.len(),
        })
    }
}

/// Classify one flow-owning path under the current controls.
pub fn path_status(graph: &PortGraph, path: &LogicalPath, valves: &[Valve]) -> FlowStatus {
    let lead_off = path
        .lead_element()
        .and_then(|e| e.output)
        .is_some_and(|o| graph.control(o).is_off());
    if path.control.is_off() || lead_off {
        return FlowStatus::Known(KnownBy::Off);
    }
    if path.flow.is_some() {
        return FlowStatus::Known(KnownBy::Schedule);
    }
    let valve = path.valve.and_then(|v| valves.get(v.slot()));
    if valve.is_some_and(|v| v.fixes_flow(path.flow_owner)) {
        return FlowStatus::Known(KnownBy::ValveShare);
    }

    let setter = path
        .elements
        .iter()
        .filter_map(|e| graph.component(e.comp))
        .find_map(|c| c.kind.flow_setter());
    match setter {
        Some(FlowSetter::VariableVolume) => FlowStatus::Known(KnownBy::VariableVolume),
        Some(FlowSetter::VariableFlow) => FlowStatus::Known(KnownBy::VariableFlow),
        None => FlowStatus::Unknown,
    }
}

/// Classify every path and collect junction balances per bundle.
///
/// Statuses are written back onto the paths; a humidity twin takes the status
/// of the path owning its flow.
pub fn classify(
    graph: &PortGraph,
    bundles: &[Bundle],
    paths: &mut [LogicalPath],
    valves: &[Valve],
    junctions: &[Junction],
) -> Vec<BundleFlows> {
    let statuses: Vec<FlowStatus> = paths
        .iter()
        .map(|p| {
            if p.owns_flow() {
                path_status(graph, p, valves)
            } else {
                FlowStatus::Unknown
            }
        })
        .collect();
    for path in paths.iter_mut() {
        path.status = statuses
            .get(path.flow_owner.slot())
            .copied()
            .unwrap_or_default();
    }

    bundles
        .iter()
        .map(|bundle| bundle_flows(bundle, paths, junctions))
        .collect()
}

/// Junctions are counted once per component. A junction downstream of another
/// counted junction still gets its own row: its leading path is a different
/// flow unknown, so skipping it would undercount the balance.
fn bundle_flows(bundle: &Bundle, paths: &[LogicalPath], junctions: &[Junction]) -> BundleFlows {
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    let mut counted: Vec<CompId> = Vec::new();

    for path in bundle
        .paths
        .iter()
        .filter_map(|id| paths.get(id.slot()))
        .filter(|p| p.owns_flow())
    {
        if path.status.is_known() {
            known.push(path.id);
            continue;
        }
        unknown.push(path.id);
        // A junction leading several unknown paths still yields one equation
        if let Some(junction) = path.leads_from
            && !counted.contains(&junction)
        {
            counted.push(junction);
        }
    }

    let owners = |ids: &[PathId]| -> Vec<PathId> {
        ids.iter()
            .copied()
            .filter(|id| paths.get(id.slot()).is_some_and(|p| p.owns_flow()))
            .collect()
    };
    let mut rows: Vec<BalanceRow> = counted
        .iter()
        .filter_map(|comp| junctions.iter().find(|j| j.comp == *comp))
        .map(|j| BalanceRow {
            junction: j.comp,
            level: j.level.unwrap_or(0),
            inbound: owners(&j.inbound),
            leading: owners(&j.leading),
        })
        .collect();
    rows.sort_by_key(|r| (r.level, r.junction));

    BundleFlows {
        bundle: bundle.id,
        known,
        unknown,
        rows,
    }
}
