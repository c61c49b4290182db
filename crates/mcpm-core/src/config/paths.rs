//! Config path resolution helpers.

use std::path::{Path, PathBuf};

pub const REGISTRY_FILE: &str = "claude_desktop_config.json";
pub const SETTINGS_FILE: &str = "mcpm.toml";

/// Environment variable overriding the registry location
pub const CONFIG_ENV_VAR: &str = "MCPM_CONFIG";

/// Claude Desktop's registry under a platform config directory.
///
/// `config_dir` is `~/Library/Application Support` on macOS, `%APPDATA%`
/// on Windows and `$XDG_CONFIG_HOME` elsewhere.
pub fn registry_path_in(config_dir: &Path) -> PathBuf {
    config_dir.join("Claude").join(REGISTRY_FILE)
}

pub fn default_registry_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(registry_path_in(&config_dir))
}

pub fn settings_path_in(config_dir: &Path) -> PathBuf {
    config_dir.join("mcp-manager").join(SETTINGS_FILE)
}

pub fn default_settings_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(settings_path_in(&config_dir))
}

/// Pick the registry path: explicit flag, then environment, then settings, then default.
pub fn resolve_registry_path(
    flag: Option<PathBuf>,
    env: Option<PathBuf>,
    settings: Option<PathBuf>,
    default: PathBuf,
) -> PathBuf {
    flag.or(env).or(settings).unwrap_or(default)
}
