//! mcp-manager Core Library
//!
//! Provides the domain logic for viewing and editing an MCP server registry
//! (`claude_desktop_config.json`) and for guessing whether each configured
//! server is listening on a local TCP port.

pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod mcp;
pub mod probe;
pub mod status;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigSource, ConfigStore, FileConfigSource, ImportPreview, MemoryConfigSource, Settings,
    };

    // MCP
    pub use crate::mcp::{McpConfig, McpServer, ServerDraft};

    // Commands
    pub use crate::commands::{ImportReport, ServerCommand, ServerReport};

    // Probe
    pub use crate::probe::{
        CommandResolver, Connector, ProbeResult, Prober, SystemResolver, TcpConnector,
    };

    // Status
    pub use crate::status::{ServerStatus, StatusBoard, StatusEntry};

    pub use crate::context::AppContext;
    pub use crate::error::ConfigError;
}
