//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};

use crate::commands::ServerCommand;
use crate::config::paths::{self, CONFIG_ENV_VAR};
use crate::config::{ConfigStore, FileConfigSource, Settings};
use crate::probe::Prober;

/// Resolved paths and settings shared by the frontends.
///
/// CLI and GUI create this once at startup and ask it for stores and
/// probers rather than reaching for global state.
#[derive(Debug, Clone)]
pub struct AppContext {
    config_path: PathBuf,
    settings_path: PathBuf,
    settings: Settings,
}

impl AppContext {
    /// Create a context with explicit paths.
    pub fn new(config_path: PathBuf, settings_path: PathBuf, settings: Settings) -> Self {
        Self {
            config_path,
            settings_path,
            settings,
        }
    }

    /// Resolve everything from the platform defaults.
    ///
    /// `config_override` (e.g. a `--config` flag) wins over `MCPM_CONFIG`,
    /// which wins over `config_path` in `mcpm.toml`.
    pub fn with_defaults(config_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let settings_path = paths::default_settings_path()?;
        let settings = Settings::load(&settings_path)?;
        let env_path = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let config_path = paths::resolve_registry_path(
            config_override,
            env_path,
            settings.config_path.clone(),
            paths::default_registry_path()?,
        );
        tracing::debug!("Using MCP registry at {}", config_path.display());

        Ok(Self::new(config_path, settings_path, settings))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Persist `config_path` in `mcpm.toml`; `None` clears it.
    ///
    /// Takes effect on the next start. `--config` and `MCPM_CONFIG` still
    /// win over the stored value.
    pub fn remember_config_path(&mut self, path: Option<PathBuf>) -> anyhow::Result<()> {
        self.settings.config_path = path;
        self.settings.save(&self.settings_path)?;
        tracing::debug!("Saved settings to {}", self.settings_path.display());
        Ok(())
    }

    pub fn config_store(&self) -> ConfigStore<FileConfigSource> {
        ConfigStore::from_path(self.config_path.clone())
    }

    pub fn server_command(&self) -> ServerCommand<FileConfigSource> {
        ServerCommand::new(self.config_store())
    }

    pub fn prober(&self) -> Prober {
        Prober::from_settings(&self.settings.probe)
    }
}
