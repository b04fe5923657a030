//! Error types for the dialogue layer.

use thiserror::Error;

use crate::controller::DialogueState;

/// Result type for dialogue operations.
pub type DialogueResult<T> = Result<T, DialogueError>;

/// Errors that can occur while loading a graph or driving a dialogue.
#[derive(Debug, Error)]
pub enum DialogueError {
    /// `open` was called while a dialogue is already running.
    #[error("cannot open a dialogue while {0}")]
    NotIdle(DialogueState),

    /// `select_choice` was called while no choice is awaited.
    #[error("cannot select a choice while {0}")]
    NotActive(DialogueState),

    /// No start node was given.
    #[error("no start node given")]
    MissingStartNode,

    /// The graph has no node with this id.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The selection does not name a presented choice or valid branch.
    #[error("invalid choice: {0}")]
    InvalidChoice(usize),

    /// A graph or configuration file could not be parsed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
