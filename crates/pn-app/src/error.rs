//! Error types for the pn-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and gives frontends one error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write project file: {path}")]
    ProjectFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Bundle not found: {0}")]
    BundleNotFound(String),

    #[error("Plant compilation failed: {0}")]
    Compile(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pn-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<pn_project::ProjectError> for AppError {
    fn from(err: pn_project::ProjectError) -> Self {
        match err {
            pn_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<pn_project::ValidationError> for AppError {
    fn from(err: pn_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<pn_graph::GraphError> for AppError {
    fn from(err: pn_graph::GraphError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<pn_network::NetworkError> for AppError {
    fn from(err: pn_network::NetworkError) -> Self {
        AppError::Network(err.to_string())
    }
}
