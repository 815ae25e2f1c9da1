//! CLI argument parsing and command handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{self, AppConfig};
use crate::filter::PathFilter;
use crate::indexer::Indexer;
use crate::matcher;
use crate::output;
use crate::scheduler::IndexScheduler;
use crate::snapshot::SnapshotStore;
use crate::store::IndexStore;
use crate::watcher::ChangeWatcher;

/// Dirhop: instant fuzzy folder lookup over a live directory catalog
#[derive(Parser, Debug)]
#[command(
    name = "dirhop",
    version,
    about = "Fuzzy folder lookup over a live directory catalog",
    long_about = "Dirhop keeps an in-memory catalog of the folders under your chosen roots \
                  and answers substring and acronym queries against it, highlighting the \
                  matched letters. The catalog persists between runs for instant startup \
                  and refreshes itself in the background while watching is active."
)]
pub struct Cli {
    /// Enable verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk the configured roots once and persist a fresh snapshot
    Index {
        /// Root folders to index (overrides the configured roots)
        #[arg(value_name = "ROOT")]
        roots: Vec<PathBuf>,
    },

    /// Search the folder catalog
    ///
    /// Matches are case-insensitive and use two strategies: a contiguous
    /// substring of the folder name, or an acronym over its camel-case
    /// segments ("na" finds "NavigationAssistant").
    Search {
        /// Query text
        query: String,

        /// Walk the roots even if a snapshot exists
        #[arg(long)]
        fresh: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep the catalog fresh and report refreshes until interrupted
    Watch,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Setup logging based on verbosity
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();

        let config_path = self.config.clone().unwrap_or_else(config::default_path);
        let app = config::load(&config_path)?;

        match self.command {
            Command::Index { roots } => handle_index(app, roots),
            Command::Search { query, fresh, json } => handle_search(app, &query, fresh, json),
            Command::Watch => handle_watch(app),
        }
    }
}

fn handle_index(mut app: AppConfig, roots: Vec<PathBuf>) -> Result<()> {
    if !roots.is_empty() {
        app.index.root_folders = roots;
    }

    let filter = PathFilter::new(&app.index)?;
    let indexer = Indexer::new(&app.index, filter);

    let started = Instant::now();
    let catalog = indexer.build();

    let snapshot = SnapshotStore::new(app.snapshot_path());
    snapshot.save(&catalog.items)?;

    println!(
        "Indexed {} folders in {:.1}ms (snapshot: {})",
        catalog.len(),
        started.elapsed().as_secs_f64() * 1000.0,
        snapshot.path().display()
    );

    Ok(())
}

fn handle_search(app: AppConfig, query: &str, fresh: bool, json: bool) -> Result<()> {
    let snapshot = SnapshotStore::new(app.snapshot_path());

    let items = if fresh { Vec::new() } else { snapshot.load() };
    let items = if items.is_empty() {
        let filter = PathFilter::new(&app.index)?;
        let catalog = Indexer::new(&app.index, filter).build();
        // Keep the snapshot warm so the next invocation starts instantly
        if let Err(e) = snapshot.save(&catalog.items) {
            log::warn!("Failed to persist snapshot: {:#}", e);
        }
        catalog.items
    } else {
        items
    };

    let results = matcher::search(&items, query);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        println!("{}", output::render_match(&result.display_spans()));
    }

    Ok(())
}

fn handle_watch(app: AppConfig) -> Result<()> {
    let store = Arc::new(IndexStore::new());
    let snapshot = SnapshotStore::new(app.snapshot_path());

    let scheduler = IndexScheduler::start(app.index.clone(), Arc::clone(&store), snapshot)?;
    let refreshed = scheduler.subscribe();

    let _watcher = ChangeWatcher::start(&app.index.root_folders, scheduler.handle())?;

    println!(
        "Watching {} root(s); Ctrl+C to stop.",
        app.index.root_folders.len()
    );

    while let Ok(catalog) = refreshed.recv() {
        println!(
            "Catalog refreshed: {} folders (scanned at {})",
            catalog.len(),
            catalog.last_full_scan.format("%H:%M:%S")
        );
    }

    Ok(())
}
