//! Shared application service layer for plantnet.
//!
//! This crate gives frontends one interface for plant file management and for
//! lowering a plant into a resolved network.

pub mod compile;
pub mod error;
pub mod project_service;

// Re-export key types for convenience
pub use compile::{CompiledPlant, compile_plant, resolve_plant};
pub use error::{AppError, AppResult};
pub use project_service::{
    BundleSummary, get_bundle, list_bundles, load_project, save_project, validate_project,
};
