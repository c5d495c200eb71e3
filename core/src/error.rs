//! Error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Service initialization error: {0}")]
    ServiceInitError(String),

    #[error("Services already initialized for project '{existing}', refusing to initialize '{requested}'")]
    DuplicateServices { existing: String, requested: String },

    #[error("Route table error: {0}")]
    RouteError(String),

    #[error("Mount target '#{0}' not found in host document")]
    MountError(String),

    #[error("Template error: {0}")]
    TemplateError(String),
}
