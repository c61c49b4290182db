//! Registry file access and manager settings
//!
//! - `parser`: lenient/strict JSON parsing and normalization
//! - `store`: load/save through an injected [`ConfigSource`]
//! - `merge`: additive import of another registry
//! - `settings`: the manager's own `mcpm.toml`

pub mod merge;
pub mod parser;
pub mod paths;
pub mod settings;
pub mod store;

pub use merge::{ImportPreview, MergeOutcome, merge_new_servers};
pub use parser::{parse_config, parse_config_strict, stringify_config};
pub use paths::{default_registry_path, default_settings_path};
pub use settings::{ProbeSettings, Settings};
pub use store::{ConfigSource, ConfigStore, FileConfigSource, MemoryConfigSource};
