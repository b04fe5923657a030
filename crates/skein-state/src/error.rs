//! Error types for the state layer.

use thiserror::Error;

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while configuring state.
///
/// Synchronization itself never fails: bag errors are logged per property.
#[derive(Debug, Error)]
pub enum StateError {
    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
