//! The resolved network and its configuration/step entry points.

use std::collections::HashMap;
use std::fmt;

use pn_core::{MassRate, PathId};
use pn_graph::{ControlState, PortGraph};
use tracing::{debug, warn};

use crate::assemble::{Assembly, assemble};
use crate::classify::{self, BundleFlows, FlowBalanceMismatch};
use crate::decl::NetworkDecl;
use crate::equations::{self, EquationSet};
use crate::error::{NetworkError, NetworkResult};
use crate::level;
use crate::path::{Bundle, Junction, LogicalPath, Valve};
use crate::propagate;

/// What to do when junction equations and unknown flows disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalancePolicy {
    /// Log the mismatch, return it as a warning and carry on.
    #[default]
    Warn,
    /// Fail with [`NetworkError::FlowBalance`].
    Deny,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    pub balance_policy: BalancePolicy,
}

/// Non-fatal findings of resolution or a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkWarning {
    FlowBalance(FlowBalanceMismatch),
}

impl fmt::Display for NetworkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkWarning::FlowBalance(m) => write!(f, "{}", m),
        }
    }
}

/// A resolved network plus what resolution had to say about it.
#[derive(Debug)]
pub struct Resolution {
    pub network: Network,
    pub warnings: Vec<NetworkWarning>,
}

/// Outcome of one step.
#[derive(Debug)]
pub struct StepOutcome {
    pub equations: EquationSet,
    pub warnings: Vec<NetworkWarning>,
}

/// Port graph plus resolved paths, bundles, valves and junctions.
///
/// The graph stays mutable through [`Network::graph_mut`] so equipment models
/// can write coefficients and controls between steps.
#[derive(Debug)]
pub struct Network {
    graph: PortGraph,
    paths: Vec<LogicalPath>,
    bundles: Vec<Bundle>,
    valves: Vec<Valve>,
    junctions: Vec<Junction>,
    by_name: HashMap<String, PathId>,
    options: ResolveOptions,
}

/// Resolve a declared network over a built port graph.
///
/// Runs path assembly, junction leveling, an initial propagation and flow
/// classification. Everything that can be wrong with the wiring fails here.
pub fn resolve(
    mut graph: PortGraph,
    decl: &NetworkDecl,
    options: ResolveOptions,
) -> NetworkResult<Resolution> {
    let Assembly {
        mut paths,
        mut bundles,
        valves,
        mut junctions,
        by_name,
    } = assemble(&mut graph, decl)?;

    level::assign_levels(&mut junctions, &paths)?;
    level::apply_levels(&junctions, &mut paths, &mut bundles);

    let mut network = Network {
        graph,
        paths,
        bundles,
        valves,
        junctions,
        by_name,
        options,
    };
    network.propagate();
    let flows = network.classify();
    let warnings = network.check_balance(&flows)?;

    debug!(
        paths = network.paths.len(),
        warnings = warnings.len(),
        "network resolved"
    );
    Ok(Resolution { network, warnings })
}

impl Network {
    pub fn graph(&self) -> &PortGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut PortGraph {
        &mut self.graph
    }

    pub fn paths(&self) -> &[LogicalPath] {
        &self.paths
    }

    pub fn path(&self, id: PathId) -> Option<&LogicalPath> {
        self.paths.get(id.slot())
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn valves(&self) -> &[Valve] {
        &self.valves
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Flow-owning logical path of a declared path.
    pub fn find_path(&self, name: &str) -> NetworkResult<PathId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownPath {
                name: name.to_string(),
            })
    }

    /// The logical paths sharing the flow of `id` (both twins of an air path).
    pub fn twins(&self, id: PathId) -> impl Iterator<Item = &LogicalPath> + '_ {
        let owner = self.path(id).map(|p| p.flow_owner);
        self.paths
            .iter()
            .filter(move |p| Some(p.flow_owner) == owner)
    }

    fn owner_of(&self, id: PathId) -> NetworkResult<PathId> {
        self.path(id)
            .map(|p| p.flow_owner)
            .ok_or_else(|| NetworkError::UnknownPath {
                name: id.to_string(),
            })
    }

    /// Set the control of a declared path (every sub-channel).
    pub fn set_path_control(&mut self, id: PathId, control: ControlState) -> NetworkResult<()> {
        let owner = self.owner_of(id)?;
        for path in self.paths.iter_mut().filter(|p| p.flow_owner == owner) {
            path.control = control;
        }
        Ok(())
    }

    /// Schedule (or clear) the flow of a declared path.
    pub fn set_path_flow(&mut self, id: PathId, flow: Option<MassRate>) -> NetworkResult<()> {
        let owner = self.owner_of(id)?;
        for path in self.paths.iter_mut().filter(|p| p.flow_owner == owner) {
            path.flow = flow;
        }
        Ok(())
    }

    /// Rewire effective upstreams for the current controls.
    pub fn propagate(&mut self) {
        propagate::propagate(&mut self.graph, &mut self.paths);
    }

    /// Classify paths under the current controls and refresh bundle counts.
    pub fn classify(&mut self) -> Vec<BundleFlows> {
        let flows = classify::classify(
            &self.graph,
            &self.bundles,
            &mut self.paths,
            &self.valves,
            &self.junctions,
        );
        for (bundle, f) in self.bundles.iter_mut().zip(&flows) {
            bundle.known_count = f.known.len();
            bundle.junction_count = f.rows.len();
        }
        flows
    }

    fn check_balance(&self, flows: &[BundleFlows]) -> NetworkResult<Vec<NetworkWarning>> {
        let mut warnings = Vec::new();
        for (bundle, f) in self.bundles.iter().zip(flows) {
            let Some(mismatch) = f.check(&bundle.name) else {
                continue;
            };
            match self.options.balance_policy {
                BalancePolicy::Deny => return Err(NetworkError::FlowBalance(mismatch)),
                BalancePolicy::Warn => {
                    warn!(
                        bundle = %mismatch.bundle,
                        equations = mismatch.equations,
                        unknowns = mismatch.unknowns,
                        "flow balance mismatch"
                    );
                    warnings.push(NetworkWarning::FlowBalance(mismatch));
                }
            }
        }
        Ok(warnings)
    }

    /// One step: propagate, classify, check the balance, flatten.
    pub fn step(&mut self) -> NetworkResult<StepOutcome> {
        self.propagate();
        let flows = self.classify();
        let warnings = self.check_balance(&flows)?;
        let equations = equations::flatten(&self.graph, &self.paths, flows)?;
        Ok(StepOutcome {
            equations,
            warnings,
        })
    }
}
