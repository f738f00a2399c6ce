//! Line statistics for file operations.
//!
//! Group summaries use a set-membership approximation: a line counts as
//! added when it does not occur anywhere in the original, and as removed
//! when it does not occur anywhere in the new content. Reordered or
//! duplicated lines are therefore not reported. The exact, hunk-based diff
//! ([`record_diff`]) is only computed for the detail view of one record.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::collections::HashSet;
use toolboard_types::{DiffStats, FileOpMetadata, ToolCallRecord, ToolStatus};

/// Number of lines in `text` (a trailing newline does not start a new line).
pub fn line_count(text: &str) -> u32 {
    text.lines().count() as u32
}

/// How one file operation contributes to group statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    Created { added: u32 },
    Modified { added: u32, removed: u32 },
}

/// Classify a file operation from its metadata.
///
/// Missing metadata counts as a creation with no lines.
pub fn classify_file_change(meta: Option<&FileOpMetadata>) -> FileChange {
    let original = meta.and_then(|m| m.original_content.as_deref()).unwrap_or("");
    let new = meta.and_then(|m| m.new_content.as_deref()).unwrap_or("");

    if original.is_empty() {
        return FileChange::Created {
            added: line_count(new),
        };
    }

    let (added, removed) = approximate_line_changes(original, new);
    FileChange::Modified { added, removed }
}

/// Set-membership line changes between `original` and `new`.
pub fn approximate_line_changes(original: &str, new: &str) -> (u32, u32) {
    let original_lines: HashSet<&str> = original.lines().collect();
    let new_lines: HashSet<&str> = new.lines().collect();

    let added = new.lines().filter(|line| !original_lines.contains(line)).count() as u32;
    let removed = original
        .lines()
        .filter(|line| !new_lines.contains(line))
        .count() as u32;
    (added, removed)
}

/// Aggregate statistics over the members of a file-operation group.
pub fn aggregate_file_ops<'a>(members: impl IntoIterator<Item = &'a ToolCallRecord>) -> DiffStats {
    let mut stats = DiffStats::default();

    for record in members {
        stats.total += 1;

        if record.status == ToolStatus::Error {
            stats.errors += 1;
            continue;
        }

        match classify_file_change(record.result_metadata.file_op()) {
            FileChange::Created { added } => {
                stats.created += 1;
                stats.added += added;
            }
            FileChange::Modified { added, removed } => {
                stats.modified += 1;
                stats.added += added;
                stats.removed += removed;
            }
        }
    }

    stats
}

/// A single line change in a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub change_type: DiffChangeType,
    /// Line number in the old file (None for additions)
    pub old_line_num: Option<u32>,
    /// Line number in the new file (None for deletions)
    pub new_line_num: Option<u32>,
    pub content: String,
}

/// Type of change in a diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffChangeType {
    Add,
    Remove,
    Context,
}

/// A contiguous block of changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<DiffLine>,
}

/// Exact diff of one file operation, for the expanded record view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub lines_added: u32,
    pub lines_removed: u32,
    pub hunks: Vec<DiffHunk>,
    pub is_identical: bool,
}

impl FileDiff {
    fn identical() -> Self {
        Self {
            lines_added: 0,
            lines_removed: 0,
            hunks: Vec::new(),
            is_identical: true,
        }
    }
}

/// Compute an exact line diff with `context_lines` of context per hunk.
pub fn compute_diff(old_text: &str, new_text: &str, context_lines: usize) -> FileDiff {
    if old_text == new_text {
        return FileDiff::identical();
    }

    let diff = TextDiff::from_lines(old_text, new_text);
    let mut hunks = Vec::new();
    let mut lines_added = 0u32;
    let mut lines_removed = 0u32;

    for group in diff.grouped_ops(context_lines) {
        let mut hunk = DiffHunk {
            old_start: 0,
            old_count: 0,
            new_start: 0,
            new_count: 0,
            lines: Vec::new(),
        };
        let mut first = true;

        for op in group {
            for change in diff.iter_changes(&op) {
                let old_idx = change.old_index().map(|i| i as u32 + 1);
                let new_idx = change.new_index().map(|i| i as u32 + 1);

                let (change_type, old_line_num, new_line_num) = match change.tag() {
                    ChangeTag::Delete => {
                        lines_removed += 1;
                        hunk.old_count += 1;
                        (DiffChangeType::Remove, old_idx, None)
                    }
                    ChangeTag::Insert => {
                        lines_added += 1;
                        hunk.new_count += 1;
                        (DiffChangeType::Add, None, new_idx)
                    }
                    ChangeTag::Equal => {
                        hunk.old_count += 1;
                        hunk.new_count += 1;
                        (DiffChangeType::Context, old_idx, new_idx)
                    }
                };

                if first {
                    hunk.old_start = old_idx.unwrap_or(1);
                    hunk.new_start = new_idx.unwrap_or(1);
                    first = false;
                }

                hunk.lines.push(DiffLine {
                    change_type,
                    old_line_num,
                    new_line_num,
                    content: change.value().trim_end_matches('\n').to_string(),
                });
            }
        }

        if !hunk.lines.is_empty() {
            hunks.push(hunk);
        }
    }

    FileDiff {
        lines_added,
        lines_removed,
        is_identical: lines_added == 0 && lines_removed == 0,
        hunks,
    }
}

/// Exact diff for a file-operation record, when it carries file metadata.
pub fn record_diff(record: &ToolCallRecord, context_lines: usize) -> Option<FileDiff> {
    let meta = record.result_metadata.file_op()?;
    let old_text = meta.original_content.as_deref().unwrap_or("");
    let new_text = meta.new_content.as_deref().unwrap_or("");
    Some(compute_diff(old_text, new_text, context_lines))
}

/// Unified diff text (like `diff -u`) for a file-operation record.
///
/// Headers are `a/<path>` and `b/<path>` with any leading `/` dropped.
pub fn record_unified_diff(record: &ToolCallRecord, path: &str, context_lines: usize) -> Option<String> {
    let meta = record.result_metadata.file_op()?;
    let path = path.trim_start_matches('/');
    let old_text = meta.original_content.as_deref().unwrap_or("");
    let new_text = meta.new_content.as_deref().unwrap_or("");

    let old_header = format!("a/{}", path);
    let new_header = format!("b/{}", path);
    let diff = TextDiff::from_lines(old_text, new_text);
    let unified = diff
        .unified_diff()
        .context_radius(context_lines)
        .header(&old_header, &new_header)
        .to_string();
    Some(unified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolboard_types::ToolMetadata;

    fn file_record(id: &str, status: ToolStatus, original: Option<&str>, new: Option<&str>) -> ToolCallRecord {
        let mut record = ToolCallRecord::new(id, "write", status, 0);
        record.result_metadata = ToolMetadata::FileOp(FileOpMetadata {
            original_content: original.map(str::to_string),
            new_content: new.map(str::to_string),
            file_path: None,
            duration_ms: None,
        });
        record
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 0);
        assert_eq!(line_count("a"), 1);
        assert_eq!(line_count("a\nb\nc"), 3);
        assert_eq!(line_count("a\nb\n"), 2);
    }

    #[test]
    fn test_creation_stats() {
        let stats = aggregate_file_ops(&[file_record("c1", ToolStatus::Completed, Some(""), Some("a\nb\nc"))]);
        assert_eq!(stats.added, 3);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.modified, 0);
        assert_eq!(stats.total, 1);
    }

    #[test]
    fn test_modification_stats() {
        let stats = aggregate_file_ops(&[file_record("c1", ToolStatus::Completed, Some("a\nb"), Some("a\nc"))]);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.modified, 1);
        assert_eq!(stats.created, 0);
    }

    #[test]
    fn test_errors_excluded_from_lines() {
        let stats = aggregate_file_ops(&[
            file_record("c1", ToolStatus::Error, Some("a"), Some("b\nc")),
            file_record("c2", ToolStatus::Completed, None, Some("x")),
        ]);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn test_missing_metadata_counts_zero_lines() {
        let record = ToolCallRecord::new("c1", "edit", ToolStatus::Completed, 0);
        let stats = aggregate_file_ops(&[record]);
        assert_eq!(stats.added, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.created, 1);
    }

    #[test]
    fn test_reordered_lines_are_invisible_to_approximation() {
        // Known limitation of the set-membership heuristic.
        assert_eq!(approximate_line_changes("a\nb\nc", "c\nb\na"), (0, 0));
        let exact = compute_diff("a\nb\nc\n", "c\nb\na\n", 3);
        assert!(exact.lines_added > 0);
    }

    #[test]
    fn test_duplicate_new_lines_counted_per_occurrence() {
        assert_eq!(approximate_line_changes("a", "a\nz\nz"), (2, 0));
    }

    #[test]
    fn test_compute_diff_identical() {
        let diff = compute_diff("one\ntwo\n", "one\ntwo\n", 3);
        assert!(diff.is_identical);
        assert!(diff.hunks.is_empty());
    }

    #[test]
    fn test_compute_diff_modified() {
        let diff = compute_diff("line1\nline2\nline3\n", "line1\nmodified\nline3\n", 3);
        assert_eq!(diff.lines_added, 1);
        assert_eq!(diff.lines_removed, 1);
        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(diff.hunks[0].old_start, 1);
    }

    #[test]
    fn test_record_diff_requires_file_metadata() {
        let plain = ToolCallRecord::new("c1", "bash", ToolStatus::Completed, 0);
        assert!(record_diff(&plain, 3).is_none());

        let record = file_record("c2", ToolStatus::Completed, None, Some("new\n"));
        let diff = record_diff(&record, 3).unwrap();
        assert_eq!(diff.lines_added, 1);
    }

    #[test]
    fn test_record_unified_diff() {
        let record = file_record("c1", ToolStatus::Completed, Some("line1\nline2\n"), Some("line1\nchanged\n"));
        let unified = record_unified_diff(&record, "src/lib.rs", 3).unwrap();
        assert!(unified.contains("--- a/src/lib.rs"));
        assert!(unified.contains("+++ b/src/lib.rs"));
        assert!(unified.contains("-line2"));
        assert!(unified.contains("+changed"));

        let absolute = record_unified_diff(&record, "/repo/src/lib.rs", 3).unwrap();
        assert!(absolute.contains("--- a/repo/src/lib.rs"));
    }
}
