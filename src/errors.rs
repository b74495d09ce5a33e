//! Structured error types for toastline
//!
//! Uses thiserror for ergonomic error definitions with automatic Display
//! and Error trait implementations.

use crate::dom::NodeId;
use thiserror::Error;

/// All possible errors in toastline
#[derive(Error, Debug)]
pub enum ToastlineError {
    /// Node is not (or no longer) a child of the document body
    #[error("Node {0} is not attached to the document body")]
    NodeNotFound(NodeId),

    /// Event message failed validation
    #[error("Invalid event: {0}")]
    InvalidEvent(&'static str),

    /// HX-Trigger header could not be parsed
    #[error("Invalid HX-Trigger header: {0}")]
    TriggerError(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience Result type using ToastlineError
pub type Result<T> = std::result::Result<T, ToastlineError>;
