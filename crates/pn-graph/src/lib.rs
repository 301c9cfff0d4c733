//! pn-graph: port graph layer for plantnet.
//!
//! Provides:
//! - Port graph data structures (Component, OutputPort, InputPort, PortGraph)
//! - The closed set of equipment kinds and their default port layouts
//! - Incremental graph builder with validation
//! - The port-matching cascade that binds declared port identifiers
//!
//! # Example
//!
//! ```
//! use pn_graph::{Channel, ComponentKind, GraphBuilder, PortMatcher, PortQuery};
//!
//! let mut builder = GraphBuilder::new();
//! let boiler = builder.add_component("BOI", ComponentKind::Boiler).unwrap();
//! let graph = builder.build().unwrap();
//!
//! let mut matcher = PortMatcher::new();
//! let bound = matcher
//!     .resolve(&graph, boiler, &PortQuery::output(None, Channel::Water, None))
//!     .unwrap();
//! assert!(bound.port().is_some());
//! ```

pub mod builder;
pub mod channel;
pub mod control;
pub mod error;
pub mod graph;
pub mod kind;
pub mod matching;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GraphBuilder;
pub use channel::{Channel, Fluid, WILDCARD};
pub use control::ControlState;
pub use error::{GraphError, GraphResult};
pub use graph::{Coefficients, Component, InputPort, OutputPort, PortGraph};
pub use kind::{ComponentKind, FlowSetter, JunctionKind, PortLayout, PortSpec};
pub use matching::{MatchRule, PortMatch, PortMatcher, PortQuery, Side};
