//! Plant network topology resolution and per-step equation assembly.
//!
//! Given a [`pn_graph::PortGraph`] and a [`NetworkDecl`], [`resolve`] binds
//! every declared path element to concrete ports, levels the junctions and
//! classifies path flows. The resulting [`Network`] is then stepped: each
//! [`Network::step`] rewires effective upstreams for the current controls and
//! flattens the graph into an [`EquationSet`].
//!
//! ```
//! use pn_graph::{ComponentKind, Fluid, GraphBuilder};
//! use pn_network::{BundleDecl, ElementDecl, NetworkDecl, PathDecl, ResolveOptions, resolve};
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_component("BOI", ComponentKind::Boiler).unwrap();
//! builder.add_component("PU", ComponentKind::Pump { variable_flow: true }).unwrap();
//! let graph = builder.build().unwrap();
//!
//! let decl = NetworkDecl {
//!     bundles: vec![BundleDecl::new("HW", Fluid::Water).path(
//!         PathDecl::new("LOOP", vec![ElementDecl::new("BOI"), ElementDecl::new("PU")]).closed(),
//!     )],
//!     valves: vec![],
//! };
//! let mut network = resolve(graph, &decl, ResolveOptions::default()).unwrap().network;
//! let step = network.step().unwrap();
//! assert_eq!(step.equations.len(), 2);
//! ```

mod assemble;
pub mod classify;
pub mod decl;
pub mod equations;
pub mod error;
pub mod level;
pub mod network;
pub mod path;
pub mod propagate;
pub mod report;

pub use classify::{BalanceRow, BundleFlows, FlowBalanceMismatch, FlowStatus, KnownBy};
pub use decl::{BundleDecl, ElementDecl, NetworkDecl, PathDecl, ValveDecl};
pub use equations::{Equation, EquationSet, Term};
pub use error::{NetworkError, NetworkResult};
pub use network::{
    BalancePolicy, Network, NetworkWarning, Resolution, ResolveOptions, StepOutcome, resolve,
};
pub use path::{Bundle, Junction, JunctionRole, LogicalPath, PathElement, Valve};
pub use report::{ReportContext, write_bindings, write_topology};
