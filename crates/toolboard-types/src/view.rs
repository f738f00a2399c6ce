//! View models handed to the renderer.

use crate::{GroupKind, GroupStats, ToolCallRecord, ToolStatus};
use serde::{Deserialize, Serialize};

/// Broad kind of action a tool performs (drives icons in the renderer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    File,
    Shell,
    Search,
    Web,
    Browser,
    Lsp,
    Mcp,
    Task,
    Other,
}

/// A resolved human-readable description of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescription {
    /// Verb phrase ("Reading", "Ran", "Performing click").
    pub verb: String,
    /// Extracted context ("config.ts", "\"TODO\"", "github.com").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub category: ActionCategory,
}

impl std::fmt::Display for ActionDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{} {}", self.verb, context),
            None => f.write_str(&self.verb),
        }
    }
}

/// One record with its display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEntryView {
    pub record: ToolCallRecord,
    pub description: String,
    pub category: ActionCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_text: Option<String>,
    /// Path the renderer may offer to open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// One group with its entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolGroupView {
    pub kind: GroupKind,
    pub entries: Vec<ToolEntryView>,
    pub stats: GroupStats,
}

/// Number of records per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u32,
    pub queued: u32,
    pub running: u32,
    pub completed: u32,
    pub error: u32,
    pub unknown: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: ToolStatus) {
        match status {
            ToolStatus::Pending => self.pending += 1,
            ToolStatus::Queued => self.queued += 1,
            ToolStatus::Running => self.running += 1,
            ToolStatus::Completed => self.completed += 1,
            ToolStatus::Error => self.error += 1,
            ToolStatus::Unknown => self.unknown += 1,
        }
    }

    /// Records not yet finished.
    pub fn in_flight(&self) -> u32 {
        self.pending + self.queued + self.running
    }

    pub fn total(&self) -> u32 {
        self.in_flight() + self.completed + self.error + self.unknown
    }
}

/// Full view of the tool activity for one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRunView {
    pub groups: Vec<ToolGroupView>,
    pub counts: StatusCounts,
}
