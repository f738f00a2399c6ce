//! Terminal rendering of a tool-run view.

use anyhow::Result;
use serde::Deserialize;
use toolboard_core::{DiffChangeType, FileDiff};
use toolboard_types::{
    DiffStats, GroupKind, GroupStats, OutcomeTally, StatusCounts, ToolCategory, ToolEntryView,
    ToolGroupView, ToolRunView, ToolStatus,
};

/// Output format of rendered views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render a view in the requested format.
pub fn render(view: &ToolRunView, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(view)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
    }
}

/// Plain-text rendering, one line per entry, groups indented under a header.
pub fn render_text(view: &ToolRunView) -> String {
    let mut lines = vec![summary_line(&view.counts)];

    for group in &view.groups {
        match group.kind {
            GroupKind::Single => {
                for entry in &group.entries {
                    lines.push(entry_line(entry, ""));
                }
            }
            _ => {
                lines.push(group_header(group));
                for entry in &group.entries {
                    lines.push(entry_line(entry, "    "));
                }
            }
        }
    }

    lines.join("\n")
}

fn summary_line(counts: &StatusCounts) -> String {
    let total = counts.total();
    if total == 0 {
        return "No tool calls".to_string();
    }

    let parts: Vec<String> = [
        (counts.running, "running"),
        (counts.queued, "queued"),
        (counts.pending, "pending"),
        (counts.error, "failed"),
        (counts.completed, "completed"),
        (counts.unknown, "unknown"),
    ]
    .iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{} {}", n, label))
    .collect();

    let noun = if total == 1 { "tool call" } else { "tool calls" };
    format!("{} {}: {}", total, noun, parts.join(", "))
}

fn status_marker(status: ToolStatus) -> &'static str {
    match status {
        ToolStatus::Running => "●",
        ToolStatus::Queued => "◌",
        ToolStatus::Pending => "?",
        ToolStatus::Completed => "✓",
        ToolStatus::Error => "✗",
        ToolStatus::Unknown => "·",
    }
}

fn entry_line(entry: &ToolEntryView, indent: &str) -> String {
    let mut line = format!(
        "{}{} {}",
        indent,
        status_marker(entry.record.status),
        entry.description
    );
    if let Some(position) = entry.record.queue_position {
        line.push_str(&format!(" [#{}]", position.saturating_add(1)));
    }
    if let Some(elapsed) = &entry.elapsed_text {
        line.push_str(&format!(" ({})", elapsed));
    }
    line
}

fn group_header(group: &ToolGroupView) -> String {
    let label = match group.kind {
        GroupKind::FileGroup => "File changes",
        GroupKind::ToolGroup(category) => category_label(category),
        GroupKind::Single => "Tool",
    };
    let stats = match &group.stats {
        GroupStats::Diff(diff) => diff_summary(diff),
        GroupStats::Tally(tally) => tally_summary(tally),
        GroupStats::None => String::new(),
    };

    if stats.is_empty() {
        format!("▾ {} ({})", label, group.entries.len())
    } else {
        format!("▾ {} ({}) {}", label, group.entries.len(), stats)
    }
}

fn category_label(category: ToolCategory) -> &'static str {
    match category {
        ToolCategory::FileOps => "File changes",
        ToolCategory::Ls => "Listings",
        ToolCategory::Read => "Reads",
        ToolCategory::Search => "Searches",
    }
}

fn diff_summary(stats: &DiffStats) -> String {
    let mut parts = vec![format!("+{} -{}", stats.added, stats.removed)];
    if stats.created > 0 {
        parts.push(format!("{} created", stats.created));
    }
    if stats.modified > 0 {
        parts.push(format!("{} modified", stats.modified));
    }
    if stats.errors > 0 {
        parts.push(format!("{} failed", stats.errors));
    }
    parts.join(", ")
}

fn tally_summary(tally: &OutcomeTally) -> String {
    if tally.error_count == 0 {
        format!("{} ok", tally.success_count)
    } else {
        format!("{} ok, {} failed", tally.success_count, tally.error_count)
    }
}

/// Render the exact diff of one file operation.
pub fn render_file_diff(path: &str, diff: &FileDiff, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(file_diff_text(path, diff)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(diff)?),
    }
}

fn file_diff_text(path: &str, diff: &FileDiff) -> String {
    if diff.is_identical {
        return format!("{}: no changes", path);
    }

    let mut lines = vec![format!("{}: +{} -{}", path, diff.lines_added, diff.lines_removed)];
    for hunk in &diff.hunks {
        lines.push(format!(
            "@@ -{},{} +{},{} @@",
            hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count
        ));
        for line in &hunk.lines {
            let sign = match line.change_type {
                DiffChangeType::Add => '+',
                DiffChangeType::Remove => '-',
                DiffChangeType::Context => ' ',
            };
            lines.push(format!("{}{}", sign, line.content));
        }
    }
    lines.join("\n")
}
