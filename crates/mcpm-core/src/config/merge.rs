//! Import merging
//!
//! Imported servers are additive: an ID that already exists in the current
//! registry keeps its current definition.

use super::parser;
use crate::mcp::McpConfig;

/// Outcome of merging an imported registry into the current one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: McpConfig,
    /// IDs newly added, in ID order
    pub added: Vec<String>,
    /// Imported IDs that were already present
    pub skipped: Vec<String>,
}

pub fn merge_new_servers(current: &McpConfig, imported: &McpConfig) -> MergeOutcome {
    let mut merged = current.clone();
    let mut added = Vec::new();
    let mut skipped = Vec::new();

    for (id, server) in &imported.mcp_servers {
        if merged.server_exists(id) {
            skipped.push(id.clone());
        } else {
            merged.mcp_servers.insert(id.clone(), server.clone());
            added.push(id.clone());
        }
    }

    MergeOutcome {
        merged,
        added,
        skipped,
    }
}

/// Live validation of text pasted into the import dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPreview {
    /// Nothing entered yet
    Empty,
    Valid(McpConfig),
    Invalid(String),
}

impl ImportPreview {
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        match parser::parse_config_strict(text) {
            Ok(config) => Self::Valid(config),
            Err(err) => Self::Invalid(format!("Error parsing JSON: {}", err.root_cause())),
        }
    }

    pub fn config(&self) -> Option<&McpConfig> {
        match self {
            Self::Valid(config) => Some(config),
            _ => None,
        }
    }

    pub fn can_import(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Valid(config) => Some(format!(
                "Valid configuration detected with {}",
                pluralize(config.len(), "server")
            )),
            Self::Invalid(message) => Some(message.clone()),
        }
    }
}

/// `1 server`, `2 servers`
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
