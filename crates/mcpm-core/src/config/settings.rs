//! Manager settings (`mcpm.toml`)
//!
//! ```toml
//! config_path = "/path/to/claude_desktop_config.json"
//!
//! [probe]
//! timeout_ms = 3000
//! host = "localhost"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Per-attempt connect timeout used by the status probe
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_PROBE_HOST: &str = "localhost";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Registry file to edit instead of Claude Desktop's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub probe: ProbeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

fn default_host() -> String {
    DEFAULT_PROBE_HOST.to_string()
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            host: DEFAULT_PROBE_HOST.to_string(),
        }
    }
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Settings {
    /// Load settings; a missing file yields defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        if settings.probe.timeout_ms == 0 {
            anyhow::bail!("probe.timeout_ms must be greater than zero");
        }
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize settings to TOML")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.probe.timeout(), Duration::from_millis(3000));
        assert_eq!(settings.probe.host, "localhost");
    }

    #[test]
    fn partial_probe_section() {
        let settings = Settings::from_toml_str("[probe]\ntimeout_ms = 500\n").unwrap();
        assert_eq!(settings.probe.timeout_ms, 500);
        assert_eq!(settings.probe.host, "localhost");
        assert!(settings.config_path.is_none());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Settings::from_toml_str("[probe]\ntimeout_ms = 0\n").is_err());
    }

    #[test]
    fn config_path_override() {
        let settings = Settings::from_toml_str("config_path = \"/tmp/mcp.json\"\n").unwrap();
        assert_eq!(settings.config_path, Some(PathBuf::from("/tmp/mcp.json")));
    }
}
