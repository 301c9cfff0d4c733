//! Graph-specific error types.

use pn_core::{CompId, InPortId, OutPortId};

use crate::channel::Channel;
use crate::matching::Side;

/// Port graph construction, lookup and port-matching errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two components share a name.
    DuplicateComponent { name: String },

    /// A name does not refer to any declared component.
    UnknownComponent { name: String },

    /// An output declares a dependency on an input tag the component does not have.
    UnknownDependency { component: String, tag: String },

    /// An output port refers to a component that doesn't exist.
    InvalidOutputRef { port: OutPortId, comp: CompId },

    /// An input port refers to a component that doesn't exist.
    InvalidInputRef { port: InPortId, comp: CompId },

    /// An output id outside the arena.
    UnknownOutput { port: OutPortId },

    /// Coefficient vector length does not match the associated inputs.
    CoefficientArity {
        port: OutPortId,
        expected: usize,
        actual: usize,
    },

    /// No matching rule binds the requested port.
    PortResolution {
        component: String,
        requested: String,
        side: Side,
        channel: Channel,
    },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateComponent { name } => {
                write!(f, "Component '{}' declared more than once", name)
            }
            GraphError::UnknownComponent { name } => {
                write!(f, "Component '{}' is not declared", name)
            }
            GraphError::UnknownDependency { component, tag } => {
                write!(
                    f,
                    "Component '{}' output depends on unknown input '{}'",
                    component, tag
                )
            }
            GraphError::InvalidOutputRef { port, comp } => {
                write!(f, "Output {} refers to non-existent component {}", port, comp)
            }
            GraphError::InvalidInputRef { port, comp } => {
                write!(f, "Input {} refers to non-existent component {}", port, comp)
            }
            GraphError::UnknownOutput { port } => {
                write!(f, "Output {} does not exist", port)
            }
            GraphError::CoefficientArity {
                port,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Output {} has {} associated inputs but {} coefficients were given",
                    port, expected, actual
                )
            }
            GraphError::PortResolution {
                component,
                requested,
                side,
                channel,
            } => {
                write!(
                    f,
                    "Cannot resolve {} port '{}' on component '{}' ({} channel)",
                    side, requested, component, channel
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

pub type GraphResult<T> = Result<T, GraphError>;
