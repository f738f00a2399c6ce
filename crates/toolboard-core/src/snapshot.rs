//! Snapshot files: one serialized set of reconciler inputs.
//!
//! [`SnapshotWatcher`] re-reads a snapshot whenever it changes on disk and
//! forwards the parsed input over a channel. The parent directory is watched
//! rather than the file itself, so editors that replace the file on save are
//! still picked up.

use crate::{Result, ToolboardError};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use toolboard_types::ReconcileInput;
use tracing::{debug, trace, warn};

/// Read and parse a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<ReconcileInput> {
    if !path.exists() {
        return Err(ToolboardError::SnapshotNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    parse_snapshot(&text)
}

/// Parse snapshot JSON text.
pub fn parse_snapshot(text: &str) -> Result<ReconcileInput> {
    Ok(serde_json::from_str(text)?)
}

/// Events emitted by the snapshot watcher.
#[derive(Debug)]
pub enum SnapshotEvent {
    /// The snapshot was (re)loaded.
    Updated(Box<ReconcileInput>),
    /// The file changed but could not be loaded; the previous snapshot stands.
    Invalid(String),
}

/// Watches a snapshot file and emits its parsed contents on every change.
pub struct SnapshotWatcher {
    path: PathBuf,
    debounce: Duration,
    event_tx: mpsc::UnboundedSender<SnapshotEvent>,
}

impl SnapshotWatcher {
    /// Create a new watcher. Events are sent through the provided channel.
    pub fn new(path: PathBuf, debounce: Duration, event_tx: mpsc::UnboundedSender<SnapshotEvent>) -> Self {
        Self {
            path,
            debounce,
            event_tx,
        }
    }

    /// Emit the current snapshot, then start watching for changes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> Result<SnapshotWatcherHandle> {
        self.emit()?;

        let watch_dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let mut file_watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = notify_tx.send(event);
            }
        })?;
        file_watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        debug!(
            target: "toolboard::watch",
            "Watching snapshot {} (debounce {}ms)",
            self.path.display(),
            self.debounce.as_millis()
        );

        let (stop_tx, mut stop_rx) = mpsc::unbounded_channel::<()>();

        tokio::spawn(async move {
            loop {
                let changed = tokio::select! {
                    Some(event) = notify_rx.recv() => self.is_relevant(&event),
                    Some(()) = stop_rx.recv() => {
                        debug!(target: "toolboard::watch", "Stopping snapshot watcher");
                        break;
                    }
                    else => break,
                };
                if !changed {
                    continue;
                }

                // Coalesce the burst of events a single save produces.
                tokio::time::sleep(self.debounce).await;
                while notify_rx.try_recv().is_ok() {}

                if self.emit().is_err() {
                    debug!(target: "toolboard::watch", "Receiver dropped, stopping snapshot watcher");
                    break;
                }
            }
        });

        Ok(SnapshotWatcherHandle {
            stop_tx,
            _file_watcher: file_watcher,
        })
    }

    fn is_relevant(&self, event: &Event) -> bool {
        let relevant_kind = matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
        );
        let file_name = self.path.file_name();
        relevant_kind && event.paths.iter().any(|p| p.file_name() == file_name)
    }

    /// Load the snapshot and send the outcome. Fails only when the receiver is gone.
    fn emit(&self) -> Result<()> {
        let event = match load_snapshot(&self.path) {
            Ok(input) => {
                trace!(
                    target: "toolboard::watch",
                    "Loaded snapshot with {} messages",
                    input.messages.len()
                );
                SnapshotEvent::Updated(Box::new(input))
            }
            Err(e) => {
                warn!(target: "toolboard::watch", "Failed to load snapshot {}: {}", self.path.display(), e);
                SnapshotEvent::Invalid(e.to_string())
            }
        };
        self.event_tx
            .send(event)
            .map_err(|_| ToolboardError::ChannelSendError)
    }
}

/// Handle to control a running snapshot watcher.
pub struct SnapshotWatcherHandle {
    stop_tx: mpsc::UnboundedSender<()>,
    _file_watcher: RecommendedWatcher,
}

impl SnapshotWatcherHandle {
    /// Stop the snapshot watcher.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(());
    }
}
