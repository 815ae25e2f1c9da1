//! Background index scheduling
//!
//! Runs the indexer off the caller's thread and decides when walks happen.
//! The worker moves between two states, idle and scanning, and a walk is
//! never run concurrently with another: rescan requests and config updates
//! that arrive while a walk is in flight queue up on the command channel and
//! are drained afterward, coalescing any number of requests into at most one
//! follow-up walk with the latest configuration.
//!
//! On start the worker publishes the persisted snapshot (if any) for instant
//! availability, then runs a full walk. Every completed walk publishes to
//! the store, persists the snapshot, and notifies subscribers; a periodic
//! timer keeps the catalog fresh between filesystem events.

use anyhow::{Context, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chrono::DateTime;

use crate::filter::PathFilter;
use crate::indexer::Indexer;
use crate::models::{Catalog, IndexConfig};
use crate::snapshot::SnapshotStore;
use crate::store::IndexStore;

enum Command {
    Rescan,
    UpdateConfig(IndexConfig, PathFilter),
    Stop,
}

type SubscriberList = Arc<Mutex<Vec<Sender<Arc<Catalog>>>>>;

/// Cloneable signalling handle for event sources like the change watcher.
///
/// Holds only the command channel, so signal producers never touch the
/// catalog or the worker directly.
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: Sender<Command>,
}

impl SchedulerHandle {
    /// Ask for a rescan. Requests made while a walk is running coalesce
    /// into a single follow-up walk. A no-op once the scheduler stopped.
    pub fn request_rescan(&self) {
        let _ = self.commands.send(Command::Rescan);
    }
}

/// Owns the background indexing thread.
pub struct IndexScheduler {
    commands: Sender<Command>,
    subscribers: SubscriberList,
    handle: Option<JoinHandle<()>>,
}

impl IndexScheduler {
    /// Validate the configuration and spawn the worker.
    ///
    /// Pattern compilation happens here, before the thread starts, so a bad
    /// exclude pattern is an immediate error rather than a mid-walk surprise.
    pub fn start(
        config: IndexConfig,
        store: Arc<IndexStore>,
        snapshot: SnapshotStore,
    ) -> Result<Self> {
        let filter = PathFilter::new(&config)?;

        let (commands, inbox) = mpsc::channel();
        let subscribers: SubscriberList = Arc::new(Mutex::new(Vec::new()));

        let worker_subscribers = Arc::clone(&subscribers);
        let handle = std::thread::Builder::new()
            .name("dirhop-indexer".to_string())
            .spawn(move || run_worker(inbox, config, filter, store, snapshot, worker_subscribers))
            .context("Failed to spawn indexer thread")?;

        Ok(Self {
            commands,
            subscribers,
            handle: Some(handle),
        })
    }

    /// A cloneable handle for signal producers.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            commands: self.commands.clone(),
        }
    }

    /// Ask for a rescan with the current configuration.
    pub fn request_rescan(&self) {
        let _ = self.commands.send(Command::Rescan);
    }

    /// Swap in a new configuration and trigger a rescan cycle.
    ///
    /// The new patterns are compiled here, failing fast; an in-flight walk
    /// finishes with the old configuration and the follow-up walk uses the
    /// new one.
    pub fn update_config(&self, config: IndexConfig) -> Result<()> {
        let filter = PathFilter::new(&config)?;
        self.commands
            .send(Command::UpdateConfig(config, filter))
            .map_err(|_| anyhow::anyhow!("Index scheduler is stopped"))
    }

    /// Register for `refreshed` notifications.
    ///
    /// Each completed walk sends its published catalog to every live
    /// receiver. A query issued after receiving a catalog observes that
    /// snapshot or a newer one from the store, never an older one.
    pub fn subscribe(&self) -> Receiver<Arc<Catalog>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// Stop the worker and wait for it to finish.
    ///
    /// An in-flight walk runs to completion first; the store is never left
    /// with a partial catalog.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.commands.send(Command::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for IndexScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct WorkerState {
    config: IndexConfig,
    filter: PathFilter,
    scan_pending: bool,
    stopping: bool,
}

impl WorkerState {
    fn apply(&mut self, command: Command) {
        match command {
            Command::Rescan => self.scan_pending = true,
            Command::UpdateConfig(config, filter) => {
                log::info!("Configuration updated, scheduling rescan");
                self.config = config;
                self.filter = filter;
                self.scan_pending = true;
            }
            Command::Stop => self.stopping = true,
        }
    }
}

fn run_worker(
    inbox: Receiver<Command>,
    config: IndexConfig,
    filter: PathFilter,
    store: Arc<IndexStore>,
    snapshot: SnapshotStore,
    subscribers: SubscriberList,
) {
    // Cold start: surface the persisted catalog before the first walk runs.
    // The epoch scan time marks it as stale until a real walk publishes.
    let cold_items = snapshot.load();
    if !cold_items.is_empty() {
        log::info!("Loaded {} folders from snapshot", cold_items.len());
        store.publish(Catalog::new(cold_items, DateTime::UNIX_EPOCH));
    }

    let mut state = WorkerState {
        config,
        filter,
        scan_pending: true,
        stopping: false,
    };
    let mut last_scan = Instant::now();

    loop {
        if state.scan_pending && !state.stopping {
            state.scan_pending = false;

            let indexer = Indexer::new(&state.config, state.filter.clone());
            let started = Instant::now();
            let catalog = indexer.build();
            let published = store.publish(catalog);

            log::info!(
                "Published catalog with {} folders in {:.1}ms",
                published.len(),
                started.elapsed().as_secs_f64() * 1000.0
            );

            // Snapshot persistence is best-effort; the in-memory publish
            // above already happened and stands regardless.
            if let Err(e) = snapshot.save(&published.items) {
                log::warn!("Failed to persist snapshot: {:#}", e);
            }

            notify_subscribers(&subscribers, &published);
            last_scan = Instant::now();
        }

        if state.stopping {
            break;
        }

        match next_command(&inbox, &state.config, last_scan) {
            WakeReason::Command(command) => state.apply(command),
            WakeReason::PeriodicTick => {
                log::debug!("Periodic refresh interval elapsed");
                state.scan_pending = true;
            }
            WakeReason::Disconnected => break,
        }

        // Drain whatever queued up while scanning or sleeping; this is what
        // coalesces a burst of requests into one follow-up walk.
        loop {
            match inbox.try_recv() {
                Ok(command) => state.apply(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    state.stopping = true;
                    break;
                }
            }
        }

        if state.stopping {
            break;
        }
    }

    log::debug!("Index scheduler worker stopped");
}

enum WakeReason {
    Command(Command),
    PeriodicTick,
    Disconnected,
}

/// Block until a command arrives or the periodic refresh interval elapses.
fn next_command(inbox: &Receiver<Command>, config: &IndexConfig, last_scan: Instant) -> WakeReason {
    if config.refresh_interval_secs == 0 {
        // Periodic refresh disabled; only commands wake the worker.
        return match inbox.recv() {
            Ok(command) => WakeReason::Command(command),
            Err(_) => WakeReason::Disconnected,
        };
    }

    let interval = Duration::from_secs(config.refresh_interval_secs);
    let timeout = interval.saturating_sub(last_scan.elapsed());

    match inbox.recv_timeout(timeout) {
        Ok(command) => WakeReason::Command(command),
        Err(RecvTimeoutError::Timeout) => WakeReason::PeriodicTick,
        Err(RecvTimeoutError::Disconnected) => WakeReason::Disconnected,
    }
}

fn notify_subscribers(subscribers: &SubscriberList, catalog: &Arc<Catalog>) {
    let mut subscribers = subscribers.lock().unwrap();
    subscribers.retain(|tx| tx.send(Arc::clone(catalog)).is_ok());
}
