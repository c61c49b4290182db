//! MCP server registry model
//!
//! The registry file holds a single `mcpServers` object keyed by server ID.
//! Each entry describes how to launch a server (command, args, env).

pub mod draft;
pub mod schema;

pub use draft::ServerDraft;
pub use schema::{McpConfig, McpServer};
