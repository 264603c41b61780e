//! # Configuration Hot Reload
//!
//! Watches environment configuration files for changes and coalesces rapid
//! write bursts into a single reload trigger. Editors and deploy tooling
//! routinely touch a file several times per save; the debounce window keeps
//! that from cascading into repeated pipeline runs.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Quiet period required after the last filesystem event before the change
/// callback fires.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Active set of filesystem watches over configuration files.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Registers a non-recursive watch on each existing configuration file and
/// invokes `on_change` once per debounced burst of modify/create events.
/// Dropping the watcher tears down every watch and stops the debounce
/// worker; pending undelivered changes are discarded.
///
/// ## Usage
/// ```rust,no_run
/// use config::ConfigWatcher;
/// use std::path::PathBuf;
///
/// fn main() -> Result<(), config::ConfigError> {
///     let watcher = ConfigWatcher::start(
///         vec![PathBuf::from("config/environments/development/app.config.json")],
///         || println!("configuration changed, reloading"),
///     )?;
///     println!("watching {} file(s)", watcher.watched_count());
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// Absent paths are skipped rather than treated as errors, so a partially
/// populated environment directory still gets watches on the files it has.
/// A watch registration that fails on an existing file returns
/// [`ConfigError::Watch`] naming the path.
pub struct ConfigWatcher {
    watchers: Vec<RecommendedWatcher>,
}

impl ConfigWatcher {
    /// Start watching `paths`, invoking `on_change` after each debounced
    /// burst of file events.
    pub fn start(
        paths: Vec<PathBuf>,
        on_change: impl Fn() + Send + 'static,
    ) -> Result<Self, ConfigError> {
        let (tx, rx) = mpsc::channel::<PathBuf>();
        let mut watchers = Vec::new();

        for path in paths {
            if !path.exists() {
                debug!("Skipping watch for absent configuration file: {:?}", path);
                continue;
            }

            let event_tx = tx.clone();
            let event_path = path.clone();
            let mut watcher =
                notify::recommended_watcher(move |result: Result<Event, notify::Error>| {
                    match result {
                        Ok(event) => {
                            if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                                let _ = event_tx.send(event_path.clone());
                            }
                        }
                        Err(error) => warn!("Watch error on {:?}: {}", event_path, error),
                    }
                })
                .map_err(|source| ConfigError::Watch {
                    path: path.clone(),
                    source,
                })?;

            watcher
                .watch(&path, RecursiveMode::NonRecursive)
                .map_err(|source| ConfigError::Watch {
                    path: path.clone(),
                    source,
                })?;

            info!("Watching configuration file: {:?}", path);
            watchers.push(watcher);
        }

        // The worker must see the channel close once every watcher is gone,
        // so only the watcher closures may keep senders alive.
        drop(tx);
        std::thread::spawn(move || debounce_worker(rx, on_change));

        Ok(Self { watchers })
    }

    /// Number of files actually under watch (absent paths were skipped).
    pub fn watched_count(&self) -> usize {
        self.watchers.len()
    }
}

/// Collapse event bursts: after a first event arrives, keep draining until
/// the channel stays quiet for [`DEBOUNCE_WINDOW`], then fire once.
fn debounce_worker(rx: mpsc::Receiver<PathBuf>, on_change: impl Fn()) {
    while let Ok(first) = rx.recv() {
        debug!("Configuration file event: {:?}", first);
        let mut disconnected = false;

        loop {
            match rx.recv_timeout(DEBOUNCE_WINDOW) {
                Ok(path) => debug!("Coalescing configuration file event: {:?}", path),
                Err(mpsc::RecvTimeoutError::Timeout) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if disconnected {
            debug!("Watcher dropped, discarding pending configuration reload");
            break;
        }

        info!("Configuration change detected, triggering reload");
        on_change();
    }

    debug!("Configuration watch worker stopped");
}
