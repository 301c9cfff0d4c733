//! Resolved network objects: path elements, logical paths, bundles, valves and
//! junctions.

use pn_core::{
    BundleId, CompId, InPortId, MassRate, OutPortId, PathId, Ratio, ValveId, as_fraction,
    unitless,
};
use pn_graph::{Channel, ControlState, Fluid, JunctionKind};

use crate::classify::FlowStatus;

/// A component with the ports bound for one sub-channel.
///
/// Either side may be absent: a source has no input, a transparent element
/// has no port on the channel, a junction binds only the side facing the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathElement {
    pub comp: CompId,
    pub input: Option<InPortId>,
    pub output: Option<OutPortId>,
}

/// How a path relates to a junction at its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JunctionRole {
    #[default]
    Plain,
    DivergeLeader,
    ConvergeLeader,
}

impl JunctionRole {
    pub fn from_kind(kind: JunctionKind) -> Self {
        match kind {
            JunctionKind::Diverge => JunctionRole::DivergeLeader,
            JunctionKind::Converge => JunctionRole::ConvergeLeader,
        }
    }
}

/// One continuous flow branch on one sub-channel.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalPath {
    pub id: PathId,
    /// Declared name; the humidity twin of an air path shares it.
    pub name: String,
    pub bundle: BundleId,
    pub channel: Channel,
    pub elements: Vec<PathElement>,
    pub closed: bool,
    pub control: ControlState,
    /// Scheduled flow.
    pub flow: Option<MassRate>,
    /// Path whose flow variable this path uses (itself on the primary channel).
    pub flow_owner: PathId,
    pub role: JunctionRole,
    /// Junction this path starts at.
    pub leads_from: Option<CompId>,
    /// Junction this path ends at.
    pub ends_at: Option<CompId>,
    /// Level of the leading junction; 0 for plain paths.
    pub level: u32,
    pub valve: Option<ValveId>,
    /// Element recorded by the last propagation as the path's virtual upstream owner.
    pub virtual_owner: Option<usize>,
    /// Outcome of the last classification.
    pub status: FlowStatus,
}

impl LogicalPath {
    pub fn owns_flow(&self) -> bool {
        self.flow_owner == self.id
    }

    /// Index of the first element the propagator sweeps.
    ///
    /// Junction leaders skip the junction itself; batch paths skip the element
    /// that seeds them.
    pub fn lead_index(&self) -> usize {
        if self.role != JunctionRole::Plain || self.control == ControlState::Batch {
            1
        } else {
            0
        }
    }

    /// The first real element of the path (not a leading junction).
    pub fn lead_element(&self) -> Option<&PathElement> {
        let index = if self.role == JunctionRole::Plain { 0 } else { 1 };
        self.elements.get(index)
    }

    /// Output of the last element that has one on this channel.
    pub fn last_output(&self) -> Option<OutPortId> {
        self.elements.iter().rev().find_map(|e| e.output)
    }
}

/// A named group of paths in one fluid domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub id: BundleId,
    pub name: String,
    pub fluid: Fluid,
    pub paths: Vec<PathId>,
    /// Flow-owning paths with a known flow, as of the last classification.
    pub known_count: usize,
    /// Junctions contributing a mass-balance equation.
    pub junction_count: usize,
    pub max_level: u32,
}

/// Two paths splitting a flow; path A takes `ratio`, path B the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct Valve {
    pub id: ValveId,
    pub name: String,
    pub component: Option<CompId>,
    pub paths: [PathId; 2],
    pub ratio: Ratio,
    pub monitor: Option<PathId>,
}

impl Valve {
    /// Share of the split carried by `path`.
    pub fn share(&self, path: PathId) -> Option<Ratio> {
        if path == self.paths[0] {
            Some(self.ratio)
        } else if path == self.paths[1] {
            Some(unitless(1.0 - as_fraction(self.ratio)))
        } else {
            None
        }
    }

    /// Whether the share alone fixes the flow of `path`.
    ///
    /// With a monitored path both shares are known; without one only path A
    /// is, as a ratio of the junction inflow, and path B is solved for.
    pub fn fixes_flow(&self, path: PathId) -> bool {
        match self.monitor {
            Some(_) => self.paths.contains(&path),
            None => path == self.paths[0],
        }
    }
}

/// A diverge or converge component with its path membership.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub comp: CompId,
    pub name: String,
    pub kind: JunctionKind,
    pub bundle: BundleId,
    /// Paths ending at the junction.
    pub inbound: Vec<PathId>,
    /// Paths starting at the junction.
    pub leading: Vec<PathId>,
    /// Dependency level; `None` until leveled.
    pub level: Option<u32>,
}
