//! Add, update, rename, delete and import server entries.

use crate::config::{ConfigSource, ConfigStore, FileConfigSource, merge_new_servers};
use crate::error::ConfigError;
use crate::mcp::{McpConfig, McpServer};

/// Report from a single-server mutation
#[derive(Debug, Clone)]
pub struct ServerReport {
    /// ID the server is saved under
    pub id: String,
    /// Previous ID when the entry was renamed
    pub renamed_from: Option<String>,
    /// Registry as written
    pub config: McpConfig,
}

/// Report from an import
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub added: Vec<String>,
    pub skipped: Vec<String>,
    pub config: McpConfig,
}

impl ImportReport {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }
}

/// Server registry operations over a [`ConfigStore`]
#[derive(Debug, Clone)]
pub struct ServerCommand<S: ConfigSource = FileConfigSource> {
    store: ConfigStore<S>,
}

impl<S: ConfigSource> ServerCommand<S> {
    pub fn new(store: ConfigStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    pub fn load(&self) -> anyhow::Result<McpConfig> {
        self.store.load()
    }

    pub fn list(&self) -> anyhow::Result<Vec<(String, McpServer)>> {
        Ok(self.store.load()?.servers())
    }

    pub fn get(&self, id: &str) -> anyhow::Result<McpServer> {
        let config = self.store.load()?;
        config
            .find_server(id)
            .cloned()
            .ok_or_else(|| ConfigError::ServerNotFound(id.to_string()).into())
    }

    /// Add a new server. A blank `id` is replaced by a fresh UUID.
    pub fn add(&self, id: &str, server: McpServer) -> anyhow::Result<ServerReport> {
        let id = resolve_id(id);
        validate(&id, &server)?;

        let mut config = self.store.load()?;
        if config.server_exists(&id) {
            return Err(ConfigError::ServerExists(id).into());
        }

        config.mcp_servers.insert(id.clone(), server);
        let config = self.store.save(&config)?;
        tracing::info!("Added MCP server {}", id);

        Ok(ServerReport {
            id,
            renamed_from: None,
            config,
        })
    }

    /// Replace an existing server definition.
    pub fn update(&self, id: &str, server: McpServer) -> anyhow::Result<ServerReport> {
        self.update_with_id(id, id, server)
    }

    /// Replace an existing server, moving it to `new_id` if that differs.
    ///
    /// A blank `new_id` is replaced by a fresh UUID.
    pub fn update_with_id(
        &self,
        original_id: &str,
        new_id: &str,
        server: McpServer,
    ) -> anyhow::Result<ServerReport> {
        let new_id = resolve_id(new_id);
        validate(&new_id, &server)?;

        let mut config = self.store.load()?;
        if !config.server_exists(original_id) {
            return Err(ConfigError::ServerNotFound(original_id.to_string()).into());
        }

        let renamed_from = if original_id != new_id {
            if config.server_exists(&new_id) {
                return Err(ConfigError::RenameConflict {
                    from: original_id.to_string(),
                    to: new_id,
                }
                .into());
            }
            tracing::info!(
                "Updating server ID from \"{}\" to \"{}\"",
                original_id,
                new_id
            );
            config.mcp_servers.remove(original_id);
            Some(original_id.to_string())
        } else {
            tracing::info!("Updating server with unchanged ID: \"{}\"", original_id);
            None
        };

        config.mcp_servers.insert(new_id.clone(), server);
        let config = self.store.save(&config)?;

        Ok(ServerReport {
            id: new_id,
            renamed_from,
            config,
        })
    }

    pub fn delete(&self, id: &str) -> anyhow::Result<ServerReport> {
        let mut config = self.store.load()?;
        if config.mcp_servers.remove(id).is_none() {
            return Err(ConfigError::ServerNotFound(id.to_string()).into());
        }
        let config = self.store.save(&config)?;
        tracing::info!("Deleted MCP server {}", id);

        Ok(ServerReport {
            id: id.to_string(),
            renamed_from: None,
            config,
        })
    }

    /// Add every imported server whose ID is not already present.
    pub fn import(&self, imported: &McpConfig) -> anyhow::Result<ImportReport> {
        let current = self.store.load()?;
        let outcome = merge_new_servers(&current, imported);
        let config = self.store.save(&outcome.merged)?;
        tracing::info!(
            "Imported {} new server(s), skipped {}",
            outcome.added.len(),
            outcome.skipped.len()
        );

        Ok(ImportReport {
            added: outcome.added,
            skipped: outcome.skipped,
            config,
        })
    }

    /// Import from pasted or file JSON; syntax errors are reported.
    pub fn import_str(&self, content: &str) -> anyhow::Result<ImportReport> {
        let imported = crate::config::parse_config_strict(content)?;
        self.import(&imported)
    }
}

fn resolve_id(id: &str) -> String {
    let id = id.trim();
    if id.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        id.to_string()
    }
}

fn validate(id: &str, server: &McpServer) -> Result<(), ConfigError> {
    if server.is_valid() {
        Ok(())
    } else {
        Err(ConfigError::InvalidServer(id.to_string()))
    }
}
