//! JSON parser for the MCP server registry
//!
//! Two entry points:
//! - [`parse_config`] is lenient: anything unreadable becomes an empty registry.
//! - [`parse_config_strict`] reports JSON syntax errors with line context.
//!
//! Both normalize the result so that only well-formed server entries survive.

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::mcp::{McpConfig, McpServer};

/// Parse registry JSON, falling back to an empty registry on syntax errors
pub fn parse_config(content: &str) -> McpConfig {
    match serde_json::from_str::<Value>(content) {
        Ok(value) => normalize_config(&value),
        Err(err) => {
            tracing::warn!("Registry is not valid JSON, using empty config: {}", err);
            McpConfig::default()
        }
    }
}

/// Parse registry JSON, rejecting syntax errors
pub fn parse_config_strict(content: &str) -> Result<McpConfig> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| enhance_json_error(e, content))?;
    Ok(normalize_config(&value))
}

/// Attach the offending line to a JSON syntax error
fn enhance_json_error(error: serde_json::Error, content: &str) -> anyhow::Error {
    let line_num = error.line();
    if line_num == 0 {
        return ConfigError::InvalidJson(error.to_string()).into();
    }
    let context = get_line_context(content, line_num);
    anyhow::Error::new(ConfigError::InvalidJson(error.to_string()))
        .context(format!("JSON parsing error at line {}:\n{}", line_num, context))
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());
    if start >= end {
        return String::new();
    }

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize a parsed registry document.
///
/// Documents using the legacy `servers` array are migrated; otherwise only
/// the `mcpServers` object is read.
pub fn normalize_config(value: &Value) -> McpConfig {
    if value.get("servers").is_some_and(Value::is_array) {
        return migrate_legacy(value);
    }

    let mut config = McpConfig::default();
    if let Some(servers) = value.get("mcpServers").and_then(Value::as_object) {
        collect_servers(servers, &mut config.mcp_servers);
    }
    config
}

/// Migrate the legacy `{"servers": [{"id": ..., "command": ...}]}` layout.
///
/// Entries already present under `mcpServers` take precedence over legacy
/// entries with the same ID.
pub fn migrate_legacy(value: &Value) -> McpConfig {
    let mut config = McpConfig::default();

    if let Some(servers) = value.get("servers").and_then(Value::as_array) {
        for entry in servers {
            let Some(id) = entry.get("id").and_then(Value::as_str) else {
                continue;
            };
            if let Some(server) = normalize_server(entry) {
                config.mcp_servers.insert(id.to_string(), server);
            }
        }
    }

    if let Some(servers) = value.get("mcpServers").and_then(Value::as_object) {
        collect_servers(servers, &mut config.mcp_servers);
    }

    config
}

fn collect_servers(servers: &Map<String, Value>, out: &mut BTreeMap<String, McpServer>) {
    for (id, data) in servers {
        match normalize_server(data) {
            Some(server) => {
                out.insert(id.clone(), server);
            }
            None => tracing::warn!("Server {} has invalid structure, skipping", id),
        }
    }
}

/// A server entry must be an object with a string `command`
pub fn is_valid_server(value: &Value) -> bool {
    value.get("command").is_some_and(Value::is_string)
}

/// Build a server from a raw entry.
///
/// `args` must be an array and `env` an object, otherwise they default to
/// empty. Numbers and booleans inside them are kept as strings; other
/// elements are dropped one by one.
pub fn normalize_server(value: &Value) -> Option<McpServer> {
    if !is_valid_server(value) {
        return None;
    }
    let command = value.get("command")?.as_str()?.to_string();

    let args = match value.get("args") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let arg = scalar_to_string(item);
                if arg.is_none() {
                    tracing::warn!("Dropping non-scalar argument #{} of {}", index, command);
                }
                arg
            })
            .collect(),
        Some(other) if !other.is_null() => {
            tracing::warn!("Ignoring args of {}: expected an array", command);
            Vec::new()
        }
        _ => Vec::new(),
    };

    let env = match value.get("env") {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(key, item)| {
                let value = scalar_to_string(item);
                if value.is_none() {
                    tracing::warn!("Dropping non-scalar env value {} of {}", key, command);
                }
                value.map(|value| (key.clone(), value))
            })
            .collect::<BTreeMap<_, _>>(),
        Some(other) if !other.is_null() => {
            tracing::warn!("Ignoring env of {}: expected an object", command);
            BTreeMap::new()
        }
        _ => BTreeMap::new(),
    };

    Some(McpServer { command, args, env })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Serialize a registry, keeping only the `mcpServers` key
pub fn stringify_config(config: &McpConfig) -> Result<String> {
    let content = serde_json::to_string_pretty(config)?;
    Ok(content)
}
