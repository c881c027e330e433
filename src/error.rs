//! Error types for the RAN CU operator.

use thiserror::Error;

/// Result type alias for operator operations
pub type Result<T, E = OperatorError> = std::result::Result<T, E>;

/// Errors raised while talking to the operator's collaborators.
///
/// Readiness problems never show up here: they are reported through
/// [`crate::operator::UnitStatus`]. An `OperatorError` means a side effect or
/// an observation failed and the current invocation is aborted.
#[derive(Debug, Error)]
pub enum OperatorError {
    /// Kubernetes API error
    #[cfg(feature = "kubernetes-operator")]
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error (Pebble layers and plans)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An external command exited unsuccessfully
    #[error("Command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Workload container error
    #[error("Workload error: {0}")]
    Workload(String),

    /// Relation data error
    #[error("Relation error: {0}")]
    Relation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OperatorError {
    /// Build a [`OperatorError::CommandFailed`] from a program and its arguments
    pub fn command_failed<S: AsRef<str>>(program: &str, args: &[S], stderr: &[u8]) -> Self {
        let mut command = program.to_string();
        for arg in args {
            command.push(' ');
            command.push_str(arg.as_ref());
        }
        OperatorError::CommandFailed {
            command,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}
