//! MCP server registry schema
//!
//! Mirrors the `claude_desktop_config.json` layout:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "filesystem": { "command": "npx", "args": ["-y", "server-fs"], "env": {} }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Launch description for a single MCP server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServer {
    /// Executable name or path
    pub command: String,

    /// Process arguments, in launch order
    #[serde(default)]
    pub args: Vec<String>,

    /// Process environment
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl McpServer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// A server needs a non-blank command to be launchable.
    pub fn is_valid(&self) -> bool {
        !self.command.trim().is_empty()
    }

    /// Full command line, for display.
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Complete registry file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: BTreeMap<String, McpServer>,
}

impl McpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_exists(&self, id: &str) -> bool {
        self.mcp_servers.contains_key(id)
    }

    pub fn find_server(&self, id: &str) -> Option<&McpServer> {
        self.mcp_servers.get(id)
    }

    /// Servers as `(id, server)` pairs, in ID order.
    pub fn servers(&self) -> Vec<(String, McpServer)> {
        self.mcp_servers
            .iter()
            .map(|(id, server)| (id.clone(), server.clone()))
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.mcp_servers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.mcp_servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mcp_servers.is_empty()
    }
}
