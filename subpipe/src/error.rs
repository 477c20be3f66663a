//! Error types surfaced by the library

use thiserror::Error;

use crate::config::ConfigError;
use crate::path::PathError;
use crate::script::SyntaxError;

/// Failure of one operation while applying a pipeline
///
/// Every variant names the configured identifier of the failing operation.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{id}: no implementation for operation '{kind}'")]
    Unsupported { id: String, kind: String },
    #[error("{id}: invalid configuration: {message}")]
    Config { id: String, message: String },
    #[error("{id}: {source}")]
    Path {
        id: String,
        #[source]
        source: PathError,
    },
    #[error("{id}: {message}")]
    Input { id: String, message: String },
    #[error("{id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

impl OperationError {
    /// Identifier of the operation that failed
    pub fn id(&self) -> &str {
        match self {
            OperationError::Unsupported { id, .. }
            | OperationError::Config { id, .. }
            | OperationError::Path { id, .. }
            | OperationError::Input { id, .. }
            | OperationError::Io { id, .. } => id,
        }
    }

    pub fn config(id: &str, message: impl Into<String>) -> Self {
        OperationError::Config {
            id: id.to_string(),
            message: message.into(),
        }
    }

    pub fn input(id: &str, message: impl Into<String>) -> Self {
        OperationError::Input {
            id: id.to_string(),
            message: message.into(),
        }
    }

    pub fn path(id: &str, source: PathError) -> Self {
        OperationError::Path {
            id: id.to_string(),
            source,
        }
    }
}

/// Any error the library can produce
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
