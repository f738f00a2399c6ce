//! Reconciler inputs: persisted chat history and the real-time feeds.
//!
//! Field names follow the host's camelCase wire format so snapshots can be
//! deserialized directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A message from the persisted chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum PersistedMessage {
    /// User prompt (not interesting to the engine).
    User {
        #[serde(default)]
        content: String,
    },
    /// Assistant turn, possibly declaring tool calls.
    Assistant(AssistantMessage),
    /// Result of one tool call.
    Tool(ToolResultMessage),
    /// Any other role (system notices and the like).
    #[serde(other)]
    Other,
}

/// Assistant message carrying tool-call declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDeclaration>,
    /// When the message was written (ms since Unix epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// The assistant's stated intent to invoke a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallDeclaration {
    pub call_id: String,
    pub name: String,
    /// Raw arguments; expected to be an object but not guaranteed.
    #[serde(default)]
    pub arguments: Value,
    /// Argument JSON still being streamed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_args_json: Option<String>,
}

/// Persisted tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultMessage {
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    /// A missing flag reads as failure.
    #[serde(default)]
    pub tool_success: bool,
    /// Untyped metadata as stored by the host.
    #[serde(default)]
    pub result_metadata: Value,
    /// When the result was stored (ms since Unix epoch).
    #[serde(default)]
    pub created_at: i64,
    /// Raw tool output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A tool currently executing, keyed by call id in [`RealtimeFeeds::executing_tools`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutingTool {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
    pub started_at: i64,
}

/// A tool waiting in the execution queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedTool {
    pub call_id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
    pub queue_position: u32,
    pub queued_at: i64,
}

/// A tool awaiting user approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTool {
    pub call_id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<i64>,
}

/// Live result event, delivered before (or alongside) the persisted result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveToolResult {
    #[serde(default)]
    pub result_metadata: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// The independently updated real-time feeds.
///
/// Maps are ordered so that repeated passes over identical input iterate
/// identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeFeeds {
    #[serde(default)]
    pub executing_tools: BTreeMap<String, ExecutingTool>,
    #[serde(default)]
    pub queued_tools: Vec<QueuedTool>,
    #[serde(default)]
    pub pending_tools: Vec<PendingTool>,
    #[serde(default)]
    pub tool_results: BTreeMap<String, LiveToolResult>,
}

/// Everything one reconciliation pass reads (also the snapshot file format).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileInput {
    #[serde(default)]
    pub messages: Vec<PersistedMessage>,
    #[serde(flatten)]
    pub feeds: RealtimeFeeds,
    #[serde(default)]
    pub is_running: bool,
}

impl ReconcileInput {
    /// Tool-call declarations in message order.
    pub fn declarations(&self) -> impl Iterator<Item = (&ToolCallDeclaration, Option<i64>)> {
        self.messages.iter().flat_map(|msg| match msg {
            PersistedMessage::Assistant(assistant) => assistant
                .tool_calls
                .iter()
                .map(|decl| (decl, assistant.created_at))
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        })
    }

    /// Persisted tool results in message order.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResultMessage> {
        self.messages.iter().filter_map(|msg| match msg {
            PersistedMessage::Tool(result) => Some(result),
            _ => None,
        })
    }
}
