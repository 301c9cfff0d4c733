//! Error types for network resolution.

use pn_core::CoreError;
use pn_graph::GraphError;
use thiserror::Error;

use crate::classify::FlowBalanceMismatch;

/// Errors raised while resolving a declared network into logical paths.
///
/// All of these are configuration-time errors; per-step propagation never
/// fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Numeric error: {0}")]
    Core(#[from] CoreError),

    #[error("Path '{name}' is not declared")]
    UnknownPath { name: String },

    #[error("Path '{name}' declared more than once")]
    DuplicatePath { name: String },

    #[error("Path '{path}' has no elements")]
    EmptyPath { path: String },

    #[error("Junction '{component}' may only start or end path '{path}'")]
    JunctionPlacement { path: String, component: String },

    #[error("Valve '{valve}' must pair two distinct paths")]
    ValveArity { valve: String },

    #[error("Junction levels do not resolve; cycle through {}", .junctions.join(", "))]
    TopologyCycle { junctions: Vec<String> },

    #[error("{0}")]
    FlowBalance(FlowBalanceMismatch),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
