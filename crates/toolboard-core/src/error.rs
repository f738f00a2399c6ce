//! Error types for Toolboard.
//!
//! The engine itself never fails; these cover snapshot I/O and watching.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolboardError {
    #[error("Snapshot not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Channel send error")]
    ChannelSendError,
}

impl From<notify::Error> for ToolboardError {
    fn from(err: notify::Error) -> Self {
        Self::WatchError(err.to_string())
    }
}
