use thiserror::Error;

use crate::graph::validate::ValidationError;

/// The main error type for Convoy operations
#[derive(Debug, Error)]
pub enum ConvoyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Batch validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("Graph error: {0}")]
    Graph(String),
}

/// Result type alias for Convoy operations
pub type ConvoyResult<T> = Result<T, ConvoyError>;
