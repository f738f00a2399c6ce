//! Tool-call reconciliation and presentation engine for Toolboard.

mod describe;
mod diff;
mod error;
mod group;
mod partial_json;
mod rank;
mod reconcile;
mod snapshot;
mod start_times;
mod view;

pub use describe::{
    action_category, describe, humanize_tool_name, string_argument, truncate_chars,
    ActionDescriber, DescribeLimits, FILE_PATH_KEYS,
};
pub use diff::{
    aggregate_file_ops, approximate_line_changes, classify_file_change, compute_diff, line_count,
    record_diff, record_unified_diff, DiffChangeType, DiffHunk, DiffLine, FileChange, FileDiff,
};
pub use error::ToolboardError;
pub use group::{group_records, MIN_GROUP_SIZE};
pub use partial_json::{parse_partial_object, partial_string_field, scrape_string_field};
pub use rank::{compare_records, rank_records, status_rank};
pub use reconcile::{arguments_from_value, reconcile, UNKNOWN_TOOL_NAME};
pub use snapshot::{load_snapshot, parse_snapshot, SnapshotEvent, SnapshotWatcher, SnapshotWatcherHandle};
pub use start_times::RunningStartTimes;
pub use view::{build_view, elapsed_ms, entry_view, file_target, format_duration_ms};

/// Result type for Toolboard operations.
pub type Result<T> = std::result::Result<T, ToolboardError>;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
