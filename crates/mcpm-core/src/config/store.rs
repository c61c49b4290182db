//! Config store for loading and saving the MCP server registry.
//!
//! The store never touches the filesystem directly; it reads and writes
//! through a [`ConfigSource`] so frontends and tests can swap the backing
//! file for an in-memory buffer.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;

use super::parser;
use crate::mcp::McpConfig;

/// Contents written when the registry file does not exist yet
pub const DEFAULT_CONFIG: &str = "{\n  \"mcpServers\": {}\n}";

/// Raw read/write access to a named registry document
pub trait ConfigSource {
    fn read_raw(&self) -> anyhow::Result<String>;
    fn write_raw(&self, content: &str) -> anyhow::Result<()>;
    /// Human-readable location, for messages
    fn describe(&self) -> String;
}

/// Registry backed by a file on disk
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    /// A missing file is created with an empty registry.
    fn read_raw(&self) -> anyhow::Result<String> {
        if !self.path.exists() {
            tracing::info!(
                "Registry not found, creating default at {}",
                self.path.display()
            );
            self.write_raw(DEFAULT_CONFIG)?;
            return Ok(DEFAULT_CONFIG.to_string());
        }
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config file: {}", self.path.display()))
    }

    fn write_raw(&self, content: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config file: {}", self.path.display()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Registry held in memory; clones share the same buffer
#[derive(Debug, Clone)]
pub struct MemoryConfigSource {
    content: Arc<Mutex<String>>,
}

impl MemoryConfigSource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Arc::new(Mutex::new(content.into())),
        }
    }

    pub fn empty() -> Self {
        Self::new(DEFAULT_CONFIG)
    }

    pub fn contents(&self) -> String {
        self.content
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl ConfigSource for MemoryConfigSource {
    fn read_raw(&self) -> anyhow::Result<String> {
        let guard = self
            .content
            .lock()
            .map_err(|_| anyhow::anyhow!("In-memory config lock poisoned"))?;
        Ok(guard.clone())
    }

    fn write_raw(&self, content: &str) -> anyhow::Result<()> {
        let mut guard = self
            .content
            .lock()
            .map_err(|_| anyhow::anyhow!("In-memory config lock poisoned"))?;
        *guard = content.to_string();
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore<S: ConfigSource = FileConfigSource> {
    source: S,
}

impl ConfigStore<FileConfigSource> {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileConfigSource::new(path))
    }

    pub fn config_path(&self) -> &Path {
        self.source.path()
    }
}

impl<S: ConfigSource> ConfigStore<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load and normalize the registry. Unparseable JSON yields an empty registry.
    pub fn load(&self) -> anyhow::Result<McpConfig> {
        let content = self.source.read_raw()?;
        Ok(parser::parse_config(&content))
    }

    /// Raw file contents, as they are on disk
    pub fn load_raw(&self) -> anyhow::Result<String> {
        self.source.read_raw()
    }

    /// Write the registry, keeping only `mcpServers`
    pub fn save(&self, config: &McpConfig) -> anyhow::Result<McpConfig> {
        let content =
            parser::stringify_config(config).context("Failed to serialize config to JSON")?;
        self.source.write_raw(&content)?;
        tracing::debug!(
            "Saved {} server(s) to {}",
            config.len(),
            self.source.describe()
        );
        Ok(config.clone())
    }

    /// Validate hand-edited JSON, normalize it and save the result
    pub fn save_raw(&self, content: &str) -> anyhow::Result<McpConfig> {
        let config = parser::parse_config_strict(content)?;
        self.save(&config)
    }
}
