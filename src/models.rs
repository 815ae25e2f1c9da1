//! Core data models for dirhop
//!
//! These structures describe the folder catalog and the highlighted match
//! results handed back to callers. Catalogs are immutable values: a rescan
//! builds a brand-new `Catalog` and publishes it wholesale, so readers never
//! observe a half-updated item list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single indexed folder.
///
/// `full_path` is canonicalized at index time (resolved, no relative
/// segments). `name` is the final path component, cached so matching never
/// has to re-derive it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileSystemItem {
    /// Final path component
    pub name: String,
    /// Canonical absolute path
    pub full_path: PathBuf,
    /// Whether the folder carries the platform hidden attribute
    pub is_hidden: bool,
}

impl FileSystemItem {
    pub fn new(name: impl Into<String>, full_path: impl Into<PathBuf>, is_hidden: bool) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            is_hidden,
        }
    }
}

/// Immutable snapshot of the indexed folder set.
///
/// Items are unique by `full_path`. A catalog is never mutated in place;
/// each completed walk replaces the published catalog as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<FileSystemItem>,
    /// Start time of the walk that produced this catalog
    pub last_full_scan: DateTime<Utc>,
}

impl Catalog {
    pub fn new(items: Vec<FileSystemItem>, last_full_scan: DateTime<Utc>) -> Self {
        Self {
            items,
            last_full_scan,
        }
    }

    /// An empty catalog with an epoch scan time, used before any walk has run.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            last_full_scan: DateTime::UNIX_EPOCH,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One run of characters in a highlighted match.
///
/// A match string is an ordered sequence of spans whose concatenated `text`
/// reconstructs the candidate name exactly. Adjacent spans never share the
/// same `is_matched` value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSpan {
    pub text: String,
    pub is_matched: bool,
}

impl MatchSpan {
    pub fn matched(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_matched: true,
        }
    }

    pub fn unmatched(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_matched: false,
        }
    }
}

/// Display text for the empty-result placeholder.
pub const NO_MATCHES_LABEL: &str = "No matching folders";

/// Display text for the overflow placeholder appended after the result cap.
pub const TOO_MANY_MATCHES_LABEL: &str = "Too many matches, keep typing";

/// A catalog item together with the highlight spans for a query.
///
/// Two placeholder forms exist alongside real results: "no matches" and
/// "too many matches". Both carry an empty `full_path` and must be treated
/// as non-navigable by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedItem {
    pub item: FileSystemItem,
    /// Spans reconstructing `item.name`, alternating matched/unmatched
    pub matched_name: Vec<MatchSpan>,
}

impl MatchedItem {
    pub fn new(item: FileSystemItem, matched_name: Vec<MatchSpan>) -> Self {
        Self { item, matched_name }
    }

    /// Placeholder returned instead of an empty result list.
    pub fn no_matches() -> Self {
        Self::placeholder(NO_MATCHES_LABEL)
    }

    /// Placeholder appended when more matches exist than the result cap.
    pub fn too_many_matches() -> Self {
        Self::placeholder(TOO_MANY_MATCHES_LABEL)
    }

    fn placeholder(label: &str) -> Self {
        Self {
            item: FileSystemItem::new(label, PathBuf::new(), false),
            matched_name: vec![MatchSpan::unmatched(label)],
        }
    }

    /// Whether this entry is a non-navigable placeholder.
    pub fn is_sentinel(&self) -> bool {
        self.item.full_path.as_os_str().is_empty()
    }

    /// The match spans plus a trailing ` -> full_path` annotation.
    ///
    /// The annotation is purely decorative; `matched_name` alone carries the
    /// match semantics. Sentinels are returned unannotated.
    pub fn display_spans(&self) -> Vec<MatchSpan> {
        let mut spans = self.matched_name.clone();
        if !self.is_sentinel() {
            spans.push(MatchSpan::unmatched(format!(
                " -> {}",
                self.item.full_path.display()
            )));
        }
        spans
    }
}

/// Configuration for indexing behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Root folders to walk
    pub root_folders: Vec<PathBuf>,
    /// Case-sensitive regular expressions tested against bare folder names
    pub exclude_patterns: Vec<String>,
    /// Index folders carrying the hidden attribute
    pub include_hidden: bool,
    /// Seconds between periodic background rescans (0 = disabled)
    pub refresh_interval_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root_folders: vec![dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))],
            exclude_patterns: vec![
                r"^\$Recycle\.Bin$".to_string(),
                r"^node_modules$".to_string(),
                r"^\.git$".to_string(),
            ],
            include_hidden: false,
            refresh_interval_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_non_navigable() {
        assert!(MatchedItem::no_matches().is_sentinel());
        assert!(MatchedItem::too_many_matches().is_sentinel());

        let real = MatchedItem::new(
            FileSystemItem::new("Documents", "/home/u/Documents", false),
            vec![MatchSpan::unmatched("Documents")],
        );
        assert!(!real.is_sentinel());
    }

    #[test]
    fn test_display_spans_append_path_annotation() {
        let item = MatchedItem::new(
            FileSystemItem::new("Documents", "/home/u/Documents", false),
            vec![MatchSpan::matched("Doc"), MatchSpan::unmatched("uments")],
        );

        let spans = item.display_spans();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[2].text, " -> /home/u/Documents");
        assert!(!spans[2].is_matched);

        // The annotation never leaks back into the match spans themselves
        assert_eq!(item.matched_name.len(), 2);
    }

    #[test]
    fn test_display_spans_leave_sentinels_bare() {
        let sentinel = MatchedItem::no_matches();
        let spans = sentinel.display_spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, NO_MATCHES_LABEL);
    }

    #[test]
    fn test_empty_catalog_has_epoch_scan_time() {
        let catalog = Catalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.last_full_scan, DateTime::UNIX_EPOCH);
    }
}
