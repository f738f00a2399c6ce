//! Canonical tool-call records.
//!
//! A [`ToolCallRecord`] is the single merged view of one tool invocation,
//! produced by reconciling persisted history with the real-time feeds.

use crate::ToolMetadata;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool arguments as a JSON object (may be partial while streaming).
pub type ToolArguments = Map<String, Value>;

/// Execution status of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// Awaiting user approval.
    Pending,
    /// Waiting in the execution queue.
    Queued,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with a failure.
    Error,
    /// Status string this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl ToolStatus {
    /// Whether this status is final (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToolStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "queued" => Ok(Self::Queued),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "Invalid tool status: '{}'. Use pending, queued, running, completed or error.",
                s
            )),
        }
    }
}

/// One reconciled tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    /// Unique call identifier (one record per id).
    pub call_id: String,
    /// Tool identifier (e.g. "read", "bash", "browser_click").
    pub name: String,
    /// Structured arguments.
    #[serde(default)]
    pub arguments: ToolArguments,
    /// Raw argument JSON while it is still streaming in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_args_json: Option<String>,
    /// Current status.
    pub status: ToolStatus,
    /// Position in the execution queue (only while queued).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<u32>,
    /// Start time (ms since Unix epoch).
    pub start_time: i64,
    /// Validated result metadata.
    #[serde(default)]
    pub result_metadata: ToolMetadata,
    /// Raw tool output, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_output: Option<String>,
}

impl ToolCallRecord {
    /// Create a record with empty arguments and no metadata.
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, status: ToolStatus, start_time: i64) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            arguments: ToolArguments::new(),
            partial_args_json: None,
            status,
            queue_position: None,
            start_time,
            result_metadata: ToolMetadata::None,
            full_output: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&ToolStatus::Queued).unwrap(), "\"queued\"");
        let status: ToolStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(status, ToolStatus::Error);
    }

    #[test]
    fn test_unrecognised_status_is_unknown() {
        let status: ToolStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, ToolStatus::Unknown);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Running".parse::<ToolStatus>().unwrap(), ToolStatus::Running);
        assert!("finished".parse::<ToolStatus>().is_err());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let mut record = ToolCallRecord::new("t1", "ls", ToolStatus::Queued, 10);
        record.queue_position = Some(0);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["callId"], "t1");
        assert_eq!(json["queuePosition"], 0);
        assert_eq!(json["startTime"], 10);
        assert!(json.get("fullOutput").is_none());
    }
}
