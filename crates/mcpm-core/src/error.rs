//! Typed errors for server registry operations.
//!
//! Operations still return `anyhow::Result`; callers that need to branch on
//! the failure kind can `downcast_ref::<ConfigError>()`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("A server with ID '{0}' already exists")]
    ServerExists(String),

    #[error("No server with ID '{0}' exists")]
    ServerNotFound(String),

    #[error("Server '{0}' has an invalid format: command is required")]
    InvalidServer(String),

    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),

    #[error("Cannot rename '{from}' to '{to}': a server with that ID already exists")]
    RenameConflict { from: String, to: String },
}
