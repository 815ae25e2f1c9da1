//! Dirhop: instant fuzzy folder lookup over a live directory catalog
//!
//! Dirhop indexes a set of root directories into an in-memory catalog and
//! answers fuzzy queries against it, highlighting which letters of each
//! folder name matched. The catalog refreshes in the background, reacts to
//! filesystem changes, and persists a snapshot for instant cold start.
//!
//! # Architecture
//!
//! - **Indexer**: walks the roots, applies the path filter, builds catalogs
//! - **IndexScheduler**: runs walks off-thread, coalesces rescan requests,
//!   drives periodic and event-triggered refresh
//! - **ChangeWatcher**: observes filesystem mutations and signals the scheduler
//! - **IndexStore**: atomically-swappable handle to the current catalog
//! - **Matcher**: substring + acronym matching with highlight spans
//! - **SnapshotStore**: durable `(name, path)` list for fast cold start
//!
//! # Example Usage
//!
//! ```no_run
//! use dirhop::{matcher, Indexer, IndexConfig, PathFilter};
//!
//! let config = IndexConfig::default();
//! let filter = PathFilter::new(&config).unwrap();
//! let catalog = Indexer::new(&config, filter).build();
//!
//! for result in matcher::search(&catalog.items, "doc") {
//!     println!("{}", result.item.full_path.display());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod filter;
pub mod indexer;
pub mod matcher;
pub mod models;
pub mod output;
pub mod scheduler;
pub mod segment;
pub mod snapshot;
pub mod store;
pub mod watcher;

// Re-export commonly used types
pub use filter::PathFilter;
pub use indexer::Indexer;
pub use models::{Catalog, FileSystemItem, IndexConfig, MatchSpan, MatchedItem};
pub use scheduler::{IndexScheduler, SchedulerHandle};
pub use snapshot::SnapshotStore;
pub use store::IndexStore;
pub use watcher::{ChangeWatcher, PathChange};
