//! Typed tool result metadata.
//!
//! Tool results arrive with an untyped JSON metadata object. It is validated
//! once at ingestion into one of the [`ToolMetadata`] variants so the rest of
//! the engine never reads ad-hoc fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata attached to a tool result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolMetadata {
    /// No usable metadata.
    #[default]
    None,
    /// File write/edit/create details.
    FileOp(FileOpMetadata),
    /// Timing only.
    Timing(TimingMetadata),
    /// Any other object, kept verbatim.
    Other { fields: Map<String, Value> },
}

/// Before/after content of a file operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOpMetadata {
    /// File content before the operation (absent or empty for new files).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
    /// File content after the operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,
    /// Path of the affected file, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Execution duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Execution timing of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingMetadata {
    pub duration_ms: u64,
}

impl ToolMetadata {
    /// Validate a raw metadata value.
    ///
    /// Non-object values degrade to [`ToolMetadata::None`]. Both camelCase
    /// and snake_case keys are accepted.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::None;
        };
        if obj.is_empty() {
            return Self::None;
        }

        let original_content = string_field(obj, &["originalContent", "original_content"]);
        let new_content = string_field(obj, &["newContent", "new_content"])
            .or_else(|| string_field(obj, &["content"]));
        let duration_ms = duration_field(obj);

        if original_content.is_some() || new_content.is_some() {
            return Self::FileOp(FileOpMetadata {
                original_content,
                new_content,
                file_path: string_field(obj, &["filePath", "file_path", "path"]),
                duration_ms,
            });
        }

        if let Some(duration_ms) = duration_ms {
            if obj.len() == 1 {
                return Self::Timing(TimingMetadata { duration_ms });
            }
        }

        Self::Other { fields: obj.clone() }
    }

    /// File operation details, if this is file metadata.
    pub fn file_op(&self) -> Option<&FileOpMetadata> {
        match self {
            Self::FileOp(meta) => Some(meta),
            _ => None,
        }
    }

    /// Duration in milliseconds, wherever the variant stores it.
    pub fn duration_ms(&self) -> Option<u64> {
        match self {
            Self::None => None,
            Self::FileOp(meta) => meta.duration_ms,
            Self::Timing(timing) => Some(timing.duration_ms),
            Self::Other { fields } => fields
                .get("durationMs")
                .or_else(|| fields.get("duration_ms"))
                .and_then(as_duration),
        }
    }

    /// Whether there is no metadata.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| obj.get(*key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

fn duration_field(obj: &Map<String, Value>) -> Option<u64> {
    obj.get("durationMs")
        .or_else(|| obj.get("duration_ms"))
        .and_then(as_duration)
}

fn as_duration(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
}
