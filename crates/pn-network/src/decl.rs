//! Declarations the network is resolved from.
//!
//! These mirror what a configuration front end hands over: bundles of named
//! paths, each an ordered list of `(component, inlet, outlet)` requests, plus
//! valves pairing two paths. Port identifiers are requests; the matcher decides
//! which concrete port they bind.

use pn_core::{MassRate, Ratio};
use pn_graph::{ControlState, Fluid};

/// The whole declared network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkDecl {
    pub bundles: Vec<BundleDecl>,
    pub valves: Vec<ValveDecl>,
}

/// A named group of paths in one fluid domain.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleDecl {
    pub name: String,
    pub fluid: Fluid,
    pub paths: Vec<PathDecl>,
}

impl BundleDecl {
    pub fn new(name: impl Into<String>, fluid: Fluid) -> Self {
        Self {
            name: name.into(),
            fluid,
            paths: Vec::new(),
        }
    }

    pub fn path(mut self, path: PathDecl) -> Self {
        self.paths.push(path);
        self
    }
}

/// One declared path. Air bundles expand it into a temperature and a humidity
/// logical path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathDecl {
    pub name: String,
    /// The last element feeds the first.
    pub closed: bool,
    pub control: ControlState,
    /// Scheduled flow, if the flow is not left to the solver.
    pub flow: Option<MassRate>,
    pub elements: Vec<ElementDecl>,
}

impl PathDecl {
    pub fn new(name: impl Into<String>, elements: Vec<ElementDecl>) -> Self {
        Self {
            name: name.into(),
            closed: false,
            control: ControlState::On,
            flow: None,
            elements,
        }
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn with_control(mut self, control: ControlState) -> Self {
        self.control = control;
        self
    }

    pub fn with_flow(mut self, flow: MassRate) -> Self {
        self.flow = Some(flow);
        self
    }
}

/// One element request: a component and, optionally, the port identifiers
/// wanted on each side.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    pub component: String,
    pub inlet: Option<String>,
    pub outlet: Option<String>,
}

impl ElementDecl {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            inlet: None,
            outlet: None,
        }
    }

    pub fn inlet(mut self, tag: impl Into<String>) -> Self {
        self.inlet = Some(tag.into());
        self
    }

    pub fn outlet(mut self, tag: impl Into<String>) -> Self {
        self.outlet = Some(tag.into());
        self
    }
}

/// Two paths sharing a flow split.
#[derive(Debug, Clone, PartialEq)]
pub struct ValveDecl {
    pub name: String,
    /// Valve component, if the split is tied to one.
    pub component: Option<String>,
    pub path_a: String,
    pub path_b: String,
    /// Share of path A; path B takes the rest.
    pub ratio: Ratio,
    /// Path whose flow the two shares split.
    pub monitor: Option<String>,
}
