//! Assemble the renderer's view model from one reconciliation pass.

use crate::describe::{string_argument, ActionDescriber, FILE_PATH_KEYS};
use crate::group::group_records;
use crate::partial_json::partial_string_field;
use crate::rank::rank_records;
use crate::reconcile::reconcile;
use crate::start_times::RunningStartTimes;
use toolboard_types::{
    ActionCategory, ReconcileInput, StatusCounts, ToolCallRecord, ToolEntryView, ToolGroupView,
    ToolRunView, ToolStatus,
};

/// Reconcile, rank, group and describe.
pub fn build_view(
    input: &ReconcileInput,
    start_times: &mut RunningStartTimes,
    now_ms: i64,
    describer: &ActionDescriber,
) -> ToolRunView {
    let records = rank_records(reconcile(input, start_times, now_ms));

    let mut counts = StatusCounts::default();
    for record in &records {
        counts.record(record.status);
    }

    let groups = group_records(records)
        .into_iter()
        .map(|group| ToolGroupView {
            kind: group.kind,
            stats: group.stats,
            entries: group
                .members
                .into_iter()
                .map(|record| entry_view(record, now_ms, describer))
                .collect(),
        })
        .collect();

    ToolRunView { groups, counts }
}

/// Display entry for one record.
pub fn entry_view(record: ToolCallRecord, now_ms: i64, describer: &ActionDescriber) -> ToolEntryView {
    let description = describer.describe_record(&record);
    let elapsed_ms = elapsed_ms(&record, now_ms);
    let file_path = file_target(&record, description.category);

    ToolEntryView {
        description: description.to_string(),
        category: description.category,
        elapsed_text: elapsed_ms.map(format_duration_ms),
        elapsed_ms,
        file_path,
        record,
    }
}

/// Elapsed time of a record: live for running calls, reported for finished ones.
pub fn elapsed_ms(record: &ToolCallRecord, now_ms: i64) -> Option<u64> {
    match record.status {
        ToolStatus::Running => Some(now_ms.saturating_sub(record.start_time).max(0) as u64),
        ToolStatus::Completed | ToolStatus::Error => record.result_metadata.duration_ms(),
        _ => None,
    }
}

/// "850ms", "1.2s", "2m 05s".
pub fn format_duration_ms(ms: u64) -> String {
    if ms < 1_000 {
        return format!("{}ms", ms);
    }
    if ms < 60_000 {
        let tenths = ms / 100;
        return format!("{}.{}s", tenths / 10, tenths % 10);
    }
    let secs = ms / 1_000;
    format!("{}m {:02}s", secs / 60, secs % 60)
}

/// Full path a renderer can offer to open for this record.
pub fn file_target(record: &ToolCallRecord, category: ActionCategory) -> Option<String> {
    if category == ActionCategory::File {
        let from_args = string_argument(&record.arguments, FILE_PATH_KEYS).or_else(|| {
            record
                .partial_args_json
                .as_deref()
                .and_then(|partial| partial_string_field(partial, FILE_PATH_KEYS))
        });
        if from_args.is_some() {
            return from_args;
        }
    }
    record
        .result_metadata
        .file_op()
        .and_then(|meta| meta.file_path.clone())
        .filter(|path| !path.trim().is_empty())
}
