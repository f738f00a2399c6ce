//! Display groups derived from ranked tool records.

use crate::{ToolCallRecord, ToolStatus};
use serde::{Deserialize, Serialize};

/// Category under which completed tool calls may be grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// write / edit / create_file
    FileOps,
    /// ls / list_directory
    Ls,
    /// read / read_file
    Read,
    /// search / grep
    Search,
}

impl ToolCategory {
    /// Map a tool name (case-insensitive) to its grouping category.
    pub fn from_tool_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "write" | "edit" | "create_file" => Some(Self::FileOps),
            "ls" | "list_directory" => Some(Self::Ls),
            "read" | "read_file" => Some(Self::Read),
            "search" | "grep" => Some(Self::Search),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileOps => "file_ops",
            Self::Ls => "ls",
            Self::Read => "read",
            Self::Search => "search",
        }
    }
}

/// Line and file statistics for a file-operation group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Lines present in new content but not in the original.
    pub added: u32,
    /// Lines present in the original but not in new content.
    pub removed: u32,
    /// Files written from empty or absent original content.
    pub created: u32,
    /// Files whose original content was non-empty.
    pub modified: u32,
    /// Members that failed.
    pub errors: u32,
    /// Member count.
    pub total: u32,
}

/// Success/error tally for non-file groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeTally {
    pub success_count: u32,
    pub error_count: u32,
}

impl OutcomeTally {
    /// Count completed and error members.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ToolCallRecord>) -> Self {
        let mut tally = Self::default();
        for record in records {
            match record.status {
                ToolStatus::Completed => tally.success_count += 1,
                ToolStatus::Error => tally.error_count += 1,
                _ => {}
            }
        }
        tally
    }
}

/// Statistics carried by a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupStats {
    /// Single items carry none.
    None,
    /// File-operation groups.
    Diff(DiffStats),
    /// Other category groups.
    Tally(OutcomeTally),
}

/// How a group is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "category", rename_all = "snake_case")]
pub enum GroupKind {
    /// One record, shown on its own.
    Single,
    /// Two or more completed file operations.
    FileGroup,
    /// Two or more completed calls of another category.
    ToolGroup(ToolCategory),
}

/// A display-only aggregation of records. Recomputed every pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolGroup {
    pub kind: GroupKind,
    pub members: Vec<ToolCallRecord>,
    pub stats: GroupStats,
}

impl ToolGroup {
    /// Wrap one record as an ungrouped item.
    pub fn single(record: ToolCallRecord) -> Self {
        Self {
            kind: GroupKind::Single,
            members: vec![record],
            stats: GroupStats::None,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self.kind, GroupKind::Single)
    }

    /// Category of a grouped item.
    pub fn category(&self) -> Option<ToolCategory> {
        match self.kind {
            GroupKind::Single => None,
            GroupKind::FileGroup => Some(ToolCategory::FileOps),
            GroupKind::ToolGroup(category) => Some(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(ToolCategory::from_tool_name("write"), Some(ToolCategory::FileOps));
        assert_eq!(ToolCategory::from_tool_name("create_file"), Some(ToolCategory::FileOps));
        assert_eq!(ToolCategory::from_tool_name("list_directory"), Some(ToolCategory::Ls));
        assert_eq!(ToolCategory::from_tool_name("Read"), Some(ToolCategory::Read));
        assert_eq!(ToolCategory::from_tool_name("grep"), Some(ToolCategory::Search));
        assert_eq!(ToolCategory::from_tool_name("bash"), None);
    }

    #[test]
    fn test_outcome_tally() {
        let records = vec![
            ToolCallRecord::new("a", "ls", ToolStatus::Completed, 0),
            ToolCallRecord::new("b", "ls", ToolStatus::Error, 0),
            ToolCallRecord::new("c", "ls", ToolStatus::Completed, 0),
        ];
        let tally = OutcomeTally::from_records(&records);
        assert_eq!(tally.success_count, 2);
        assert_eq!(tally.error_count, 1);
    }

    #[test]
    fn test_group_kind_wire_form() {
        let json = serde_json::to_value(GroupKind::ToolGroup(ToolCategory::Ls)).unwrap();
        assert_eq!(json["type"], "tool_group");
        assert_eq!(json["category"], "ls");

        let json = serde_json::to_value(GroupKind::FileGroup).unwrap();
        assert_eq!(json["type"], "file_group");
    }
}
