//! Unified error types for the dctop workspace.
//!
//! Each higher-level crate defines its own domain-specific error enum that wraps
//! these common variants when appropriate.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum DctopError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The container runtime rejected or failed an operation.
    #[error("runtime error: {message}")]
    Runtime {
        /// Description from the runtime collaborator.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl DctopError {
    /// Returns true for delete failures the runtime reports when a removal
    /// is already underway or the container is already gone. These are
    /// benign races with the refresh cycle and are swallowed by callers.
    #[must_use]
    pub fn is_benign_delete_failure(&self) -> bool {
        match self {
            Self::Runtime { message } => {
                message.contains("is already in progress")
                    || message.contains("No such container")
            }
            Self::NotFound { .. } => true,
            _ => false,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DctopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_in_progress_is_benign() {
        let err = DctopError::Runtime {
            message: "removal of container 3f2a is already in progress".into(),
        };
        assert!(err.is_benign_delete_failure());
    }

    #[test]
    fn missing_container_is_benign() {
        let err = DctopError::Runtime {
            message: "No such container: 3f2a".into(),
        };
        assert!(err.is_benign_delete_failure());
    }

    #[test]
    fn other_runtime_errors_are_not_benign() {
        let err = DctopError::Runtime {
            message: "daemon connection reset".into(),
        };
        assert!(!err.is_benign_delete_failure());
    }
}
