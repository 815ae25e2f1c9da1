//! Settings file loading and validation
//!
//! Settings live in a small TOML document:
//!
//! ```toml
//! [index]
//! root_folders = ["/home/u", "/srv/shared"]
//! exclude_patterns = ["^node_modules$", "^\\.git$"]
//! include_hidden = false
//! refresh_interval_secs = 300
//!
//! [snapshot]
//! path = "/var/cache/dirhop/catalog.bin"
//! ```
//!
//! Every field is optional and falls back to its default. Exclude patterns
//! are compiled during loading so a bad pattern is rejected here, before any
//! scheduler starts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::PathFilter;
use crate::models::IndexConfig;
use crate::snapshot::SnapshotStore;

/// Top-level settings document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub index: IndexConfig,
    pub snapshot: SnapshotConfig,
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Override for the snapshot file location
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// The snapshot location, configured or platform default.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot
            .path
            .clone()
            .unwrap_or_else(SnapshotStore::default_path)
    }
}

/// Platform-default config file location.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dirhop")
        .join("config.toml")
}

/// Load settings from a TOML file, falling back to defaults when missing.
///
/// Parse failures and invalid exclude patterns are errors; a configuration
/// is either fully usable or rejected here.
pub fn load(path: &Path) -> Result<AppConfig> {
    let config = if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse config file {:?}", path))?
    } else {
        log::debug!("No config file at {:?}, using defaults", path);
        AppConfig::default()
    };

    // Compile the patterns now so configuration errors never surface mid-walk
    PathFilter::new(&config.index)
        .with_context(|| format!("Invalid configuration in {:?}", path))?;

    Ok(config)
}
