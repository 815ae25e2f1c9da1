//! Catalog construction by directory walking
//!
//! The indexer walks each configured root recursively and collects every
//! directory that passes the path filter into a fresh catalog. Coverage
//! beats strictness: a directory that cannot be enumerated (permissions,
//! transient races, over-long paths) is skipped and the walk moves on. A
//! rejected directory prunes its entire subtree, so excluded trees cost
//! nothing to traverse.

use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::filter::{self, PathFilter};
use crate::models::{Catalog, FileSystemItem, IndexConfig};

/// Builds catalogs from the configured roots.
pub struct Indexer {
    roots: Vec<PathBuf>,
    filter: PathFilter,
}

impl Indexer {
    /// Create an indexer for the configuration's roots with a compiled filter.
    pub fn new(config: &IndexConfig, filter: PathFilter) -> Self {
        Self {
            roots: config.root_folders.clone(),
            filter,
        }
    }

    /// Walk all roots and build a new catalog.
    ///
    /// The catalog's scan time is the walk's start time. Items are unique by
    /// canonical path even when roots overlap. Never fails: roots that cannot
    /// be resolved and directories that cannot be enumerated are skipped.
    pub fn build(&self) -> Catalog {
        let started = Utc::now();
        let mut items = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for root in &self.roots {
            // Canonicalizing the root up front keeps every descendant path
            // canonical without a per-directory resolution call.
            let root = match std::fs::canonicalize(root) {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping root {:?}: {}", root, e);
                    continue;
                }
            };

            self.walk_root(&root, &mut items, &mut seen);
        }

        log::info!(
            "Walked {} root(s), cataloged {} folders",
            self.roots.len(),
            items.len()
        );

        Catalog::new(items, started)
    }

    fn walk_root(&self, root: &Path, items: &mut Vec<FileSystemItem>, seen: &mut HashSet<PathBuf>) {
        // The root itself is exempt from filtering: it was chosen explicitly,
        // so the hidden/exclude policy only governs discovered subdirectories.
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || self.should_descend(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path().to_path_buf();
            if !seen.insert(path.clone()) {
                continue;
            }

            let hidden = filter::is_hidden(&path);
            items.push(FileSystemItem::new(folder_name(&path), path, hidden));
        }
    }

    /// Yield/descend predicate: only directories the filter accepts are
    /// cataloged, and rejection cuts off the whole subtree beneath them.
    fn should_descend(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        self.filter.is_acceptable(&name, filter::is_hidden(entry.path()))
    }
}

/// Final path component, falling back to the full path for roots like `/`.
fn folder_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_else(|| path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn build_with(root: &Path, config: IndexConfig) -> Catalog {
        let config = IndexConfig {
            root_folders: vec![root.to_path_buf()],
            ..config
        };
        let filter = PathFilter::new(&config).unwrap();
        Indexer::new(&config, filter).build()
    }

    fn names(catalog: &Catalog) -> BTreeSet<String> {
        catalog.items.iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn test_walk_collects_nested_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Projects/rust/dirhop")).unwrap();
        fs::create_dir(temp.path().join("Music")).unwrap();
        fs::write(temp.path().join("notes.txt"), "not a folder").unwrap();

        let catalog = build_with(
            temp.path(),
            IndexConfig {
                exclude_patterns: vec![],
                ..IndexConfig::default()
            },
        );

        let found = names(&catalog);
        assert!(found.contains("Projects"));
        assert!(found.contains("rust"));
        assert!(found.contains("dirhop"));
        assert!(found.contains("Music"));
        assert!(!found.contains("notes.txt"));
    }

    #[test]
    fn test_root_itself_is_cataloged() {
        let temp = TempDir::new().unwrap();
        let catalog = build_with(
            temp.path(),
            IndexConfig {
                exclude_patterns: vec![],
                ..IndexConfig::default()
            },
        );

        let canonical = fs::canonicalize(temp.path()).unwrap();
        assert!(catalog.items.iter().any(|i| i.full_path == canonical));
    }

    #[test]
    fn test_excluded_directory_prunes_its_subtree() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("node_modules/serde/src")).unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();

        let catalog = build_with(
            temp.path(),
            IndexConfig {
                exclude_patterns: vec!["^node_modules$".to_string()],
                ..IndexConfig::default()
            },
        );

        let found = names(&catalog);
        assert!(!found.contains("node_modules"));
        // "serde" and its "src" would pass the filter on their own names,
        // but exclusion is inherited downward
        assert!(!found.contains("serde"));
        assert!(found.contains("src"));
        assert_eq!(
            catalog.items.iter().filter(|i| i.name == "src").count(),
            1
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_hidden_directories_skipped_unless_configured() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".cache/data")).unwrap();
        fs::create_dir(temp.path().join("visible")).unwrap();

        let default = build_with(
            temp.path(),
            IndexConfig {
                exclude_patterns: vec![],
                include_hidden: false,
                ..IndexConfig::default()
            },
        );
        assert!(!names(&default).contains(".cache"));
        assert!(!names(&default).contains("data"));

        let with_hidden = build_with(
            temp.path(),
            IndexConfig {
                exclude_patterns: vec![],
                include_hidden: true,
                ..IndexConfig::default()
            },
        );
        assert!(names(&with_hidden).contains(".cache"));
        let cache_item = with_hidden
            .items
            .iter()
            .find(|i| i.name == ".cache")
            .unwrap();
        assert!(cache_item.is_hidden);
    }

    #[test]
    fn test_overlapping_roots_deduplicate_by_canonical_path() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("outer/inner")).unwrap();

        let config = IndexConfig {
            root_folders: vec![temp.path().to_path_buf(), temp.path().join("outer")],
            exclude_patterns: vec![],
            ..IndexConfig::default()
        };
        let filter = PathFilter::new(&config).unwrap();
        let catalog = Indexer::new(&config, filter).build();

        let inner_count = catalog
            .items
            .iter()
            .filter(|i| i.name == "inner")
            .count();
        assert_eq!(inner_count, 1);

        let mut paths: Vec<&PathBuf> = catalog.items.iter().map(|i| &i.full_path).collect();
        let total = paths.len();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), total);
    }

    #[test]
    fn test_missing_root_is_skipped_not_fatal() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();

        let config = IndexConfig {
            root_folders: vec![
                temp.path().join("does-not-exist"),
                temp.path().to_path_buf(),
            ],
            exclude_patterns: vec![],
            ..IndexConfig::default()
        };
        let filter = PathFilter::new(&config).unwrap();
        let catalog = Indexer::new(&config, filter).build();

        assert!(names(&catalog).contains("real"));
    }

    #[test]
    fn test_repeated_walks_over_unchanged_tree_are_idempotent() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::create_dir_all(temp.path().join("c")).unwrap();

        let config = IndexConfig {
            root_folders: vec![temp.path().to_path_buf()],
            exclude_patterns: vec![],
            ..IndexConfig::default()
        };
        let filter = PathFilter::new(&config).unwrap();
        let indexer = Indexer::new(&config, filter);

        let first: BTreeSet<PathBuf> = indexer
            .build()
            .items
            .into_iter()
            .map(|i| i.full_path)
            .collect();
        let second: BTreeSet<PathBuf> = indexer
            .build()
            .items
            .into_iter()
            .map(|i| i.full_path)
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_scan_time_is_walk_start() {
        let temp = TempDir::new().unwrap();
        let before = Utc::now();
        let catalog = build_with(temp.path(), IndexConfig::default());
        let after = Utc::now();

        assert!(catalog.last_full_scan >= before);
        assert!(catalog.last_full_scan <= after);
    }
}
