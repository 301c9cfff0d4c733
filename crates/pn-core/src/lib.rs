//! pn-core: stable foundation for plantnet.
//!
//! Contains:
//! - units (uom SI types for path flows and valve ratios)
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for graph/network objects)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
