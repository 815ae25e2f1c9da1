//! Filesystem change watcher
//!
//! Observes additions, removals, and renames under the configured roots and
//! signals the scheduler when the folder set may have changed. Events are
//! batched over a short quiet period so a burst of mutations (an unzip, a
//! build, a recursive delete) triggers one rescan instead of dozens.
//!
//! The watcher only ever signals; it never touches the catalog. When the
//! watch subsystem reports overflow or loses track of its targets, a rescan
//! is forced immediately so the catalog cannot go silently stale.

use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::scheduler::SchedulerHandle;

/// Quiet period after the last event before a batch triggers a rescan.
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Poll interval for the debounce timer.
const POLL: Duration = Duration::from_millis(100);

/// A single observed filesystem mutation under a watched root.
///
/// Both paths present for a rename, only `new_path` for a creation, only
/// `old_path` for a deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub old_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
}

impl PathChange {
    pub fn created(path: PathBuf) -> Self {
        Self {
            old_path: None,
            new_path: Some(path),
        }
    }

    pub fn removed(path: PathBuf) -> Self {
        Self {
            old_path: Some(path),
            new_path: None,
        }
    }

    pub fn renamed(old_path: PathBuf, new_path: PathBuf) -> Self {
        Self {
            old_path: Some(old_path),
            new_path: Some(new_path),
        }
    }
}

/// Watches the configured roots and signals the scheduler on changes.
pub struct ChangeWatcher {
    watcher: Option<RecommendedWatcher>,
    handle: Option<JoinHandle<()>>,
}

impl ChangeWatcher {
    /// Start watching the given roots recursively.
    ///
    /// Roots that cannot be watched are logged and skipped; the periodic
    /// refresh timer covers them. Fails only when the watch subsystem itself
    /// cannot be created.
    pub fn start(roots: &[PathBuf], scheduler: SchedulerHandle) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(tx, Config::default())
            .context("Failed to create filesystem watcher")?;

        let mut watched = 0;
        for root in roots {
            match watcher.watch(root, RecursiveMode::Recursive) {
                Ok(()) => watched += 1,
                Err(e) => log::warn!("Cannot watch {:?}: {}", root, e),
            }
        }

        if watched == 0 && !roots.is_empty() {
            log::warn!("No roots could be watched; relying on periodic refresh only");
        } else {
            log::info!("Watching {} of {} root(s) for changes", watched, roots.len());
        }

        let handle = std::thread::Builder::new()
            .name("dirhop-watcher".to_string())
            .spawn(move || run_event_loop(rx, scheduler))
            .context("Failed to spawn watcher thread")?;

        Ok(Self {
            watcher: Some(watcher),
            handle: Some(handle),
        })
    }

    /// Stop observing and wait for the event loop to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the OS watcher closes the event channel, which ends the loop
        self.watcher.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_event_loop(rx: Receiver<notify::Result<Event>>, scheduler: SchedulerHandle) {
    let mut pending: Vec<PathChange> = Vec::new();
    let mut last_event: Option<Instant> = None;

    loop {
        match rx.recv_timeout(POLL) {
            Ok(Ok(event)) => {
                if event.need_rescan() {
                    log::warn!("Watch backlog overflowed, forcing full rescan");
                    pending.clear();
                    last_event = None;
                    scheduler.request_rescan();
                    continue;
                }

                let changes = changes_from_event(&event);
                if !changes.is_empty() {
                    pending.extend(changes);
                    last_event = Some(Instant::now());
                }
            }
            Ok(Err(e)) => {
                // A broken watch must not leave the catalog silently stale
                log::warn!("Watch error, forcing full rescan: {}", e);
                pending.clear();
                last_event = None;
                scheduler.request_rescan();
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Some(last) = last_event {
                    if !pending.is_empty() && last.elapsed() >= DEBOUNCE {
                        log::debug!(
                            "Detected {} folder change(s), requesting rescan",
                            pending.len()
                        );
                        pending.clear();
                        last_event = None;
                        scheduler.request_rescan();
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::debug!("Change watcher stopped");
}

/// Map a raw notify event onto the catalog-relevant change shape.
///
/// Content and metadata modifications are ignored; they cannot alter the
/// folder set.
fn changes_from_event(event: &Event) -> Vec<PathChange> {
    match event.kind {
        EventKind::Create(_) => event
            .paths
            .iter()
            .map(|path| PathChange::created(path.clone()))
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .iter()
            .map(|path| PathChange::removed(path.clone()))
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => {
            vec![PathChange::renamed(
                event.paths[0].clone(),
                event.paths[1].clone(),
            )]
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => event
            .paths
            .iter()
            .map(|path| PathChange::removed(path.clone()))
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event
            .paths
            .iter()
            .map(|path| PathChange::created(path.clone()))
            .collect(),
        // Some platforms report renames without a direction; treat each path
        // as potentially new so the batch still triggers a rescan
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|path| PathChange::created(path.clone()))
            .collect(),
        _ => Vec::new(),
    }
}
