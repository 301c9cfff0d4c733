//! Flattened per-step equation set handed to the numeric solver.

use std::collections::HashMap;

use pn_core::{OutPortId, PathId, Real, ensure_finite};
use pn_graph::PortGraph;
use tracing::{debug, trace};

use crate::classify::BundleFlows;
use crate::path::LogicalPath;
use crate::error::NetworkResult;

/// `coeff · unknown[unknown]` on the upstream side of an equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub unknown: usize,
    pub coeff: Real,
}

/// `coeffo · x[unknown] − Σ coeff_i · x[term_i] = co`
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub output: OutPortId,
    pub unknown: usize,
    pub coeffo: Real,
    pub co: Real,
    pub terms: Vec<Term>,
}

/// Everything the solver needs for one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquationSet {
    /// Output ports solved for, in arena order.
    pub unknowns: Vec<OutPortId>,
    /// One equation per unknown, aligned with `unknowns`.
    pub equations: Vec<Equation>,
    pub bundles: Vec<BundleFlows>,
}

impl EquationSet {
    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn unknown_index(&self, port: OutPortId) -> Option<usize> {
        self.unknowns.iter().position(|&u| u == port)
    }

    pub fn equation_for(&self, port: OutPortId) -> Option<&Equation> {
        self.unknown_index(port).map(|i| &self.equations[i])
    }
}

/// Flatten the propagated graph.
///
/// Every output bound into a path that is not OFF, and not OFF itself, is an
/// unknown. An upstream term is kept only when the input has an effective
/// upstream that is itself an unknown.
pub fn flatten(
    graph: &PortGraph,
    paths: &[LogicalPath],
    bundles: Vec<BundleFlows>,
) -> NetworkResult<EquationSet> {
    let path_off = |id: PathId| paths.get(id.slot()).is_some_and(|p| p.control.is_off());
    let unknowns: Vec<OutPortId> = graph
        .outputs()
        .iter()
        .filter(|p| p.path.is_some_and(|id| !path_off(id)) && !p.control.is_off())
        .map(|p| p.id)
        .collect();
    let index: HashMap<OutPortId, usize> = unknowns
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i))
        .collect();

    let mut equations = Vec::with_capacity(unknowns.len());
    for (unknown, &id) in unknowns.iter().enumerate() {
        let port = &graph.outputs()[id.slot()];
        let coeffo = ensure_finite(port.coeffs.coeffo, "coeffo")?;
        let co = ensure_finite(port.coeffs.co, "co")?;

        let mut terms = Vec::with_capacity(port.inputs.len());
        for (&input, &coeff) in port.inputs.iter().zip(&port.coeffs.coeffin) {
            let coeff = ensure_finite(coeff, "coeffin")?;
            let Some(upstream) = graph.input(input).and_then(|p| p.upv) else {
                continue;
            };
            match index.get(&upstream) {
                Some(&u) => terms.push(Term { unknown: u, coeff }),
                None => trace!(
                    input = %graph.input_label(input),
                    upstream = %graph.output_label(upstream),
                    "upstream is not solved for; term dropped"
                ),
            }
        }

        equations.push(Equation {
            output: id,
            unknown,
            coeffo,
            co,
            terms,
        });
    }

    debug!(
        unknowns = unknowns.len(),
        bundles = bundles.len(),
        "equation set flattened"
    );
    Ok(EquationSet {
        unknowns,
        equations,
        bundles,
    })
}
