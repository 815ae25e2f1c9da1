//! Folder acceptance policy
//!
//! Decides which discovered directories make it into the catalog: hidden
//! folders are rejected unless configured otherwise, and any folder whose
//! bare name matches an exclude pattern is rejected wherever it appears in
//! the tree. Patterns are compiled once here, when a configuration is
//! accepted, so a bad pattern surfaces before any walk starts instead of on
//! every directory.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

use crate::models::IndexConfig;

/// Compiled form of the hidden/exclude policy.
///
/// Pure predicate over a folder's name and hidden attribute; performs no I/O.
#[derive(Debug, Clone)]
pub struct PathFilter {
    exclude: Vec<Regex>,
    include_hidden: bool,
}

impl PathFilter {
    /// Compile the exclude patterns from a configuration.
    ///
    /// Fails on the first invalid pattern, naming it, so configuration
    /// errors are reported exactly once at acceptance time.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let mut exclude = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            let re = Regex::new(pattern)
                .with_context(|| format!("Invalid exclude pattern '{}'", pattern))?;
            exclude.push(re);
        }

        Ok(Self {
            exclude,
            include_hidden: config.include_hidden,
        })
    }

    /// Whether a folder with this bare name and hidden attribute belongs in
    /// the catalog.
    ///
    /// Patterns are case-sensitive and tested against the name only, never
    /// the full path, so an excluded name is rejected at any depth.
    pub fn is_acceptable(&self, name: &str, is_hidden: bool) -> bool {
        if is_hidden && !self.include_hidden {
            return false;
        }

        !self.exclude.iter().any(|re| re.is_match(name))
    }
}

/// Whether a directory carries the platform hidden attribute.
#[cfg(windows)]
pub fn is_hidden(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    std::fs::metadata(path)
        .map(|meta| meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

/// Whether a directory carries the platform hidden attribute.
#[cfg(not(windows))]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
