//! Merge persisted tool history with the real-time feeds.
//!
//! Precedence (highest first):
//! 1. Persisted tool results (completed / error)
//! 2. Executing feed (running)
//! 3. Queued feed (queued)
//! 4. Pending-approval feed (pending)
//! 5. Declared but unreported calls while a run is active (assumed running)
//!
//! Each call id yields exactly one record. Output order follows the steps
//! above; display order is applied afterwards by [`crate::rank_records`].

use crate::RunningStartTimes;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use toolboard_types::{
    ReconcileInput, StatusCounts, ToolArguments, ToolCallDeclaration, ToolCallRecord,
    ToolMetadata, ToolStatus,
};
use tracing::{debug, trace};

/// Name given to results whose declaration is missing from history.
pub const UNKNOWN_TOOL_NAME: &str = "unknown";

/// Declaration resolved from the assistant messages.
#[derive(Debug)]
struct DeclaredCall<'a> {
    name: &'a str,
    arguments: ToolArguments,
    partial_args_json: Option<&'a str>,
    created_at: Option<i64>,
}

impl<'a> DeclaredCall<'a> {
    fn from_declaration(decl: &'a ToolCallDeclaration, created_at: Option<i64>) -> Self {
        Self {
            name: decl.name.as_str(),
            arguments: arguments_from_value(&decl.arguments),
            partial_args_json: decl.partial_args_json.as_deref(),
            created_at,
        }
    }
}

/// Normalize raw arguments into an object.
///
/// Objects pass through; a string holding a JSON object is parsed; anything
/// else degrades to empty arguments.
pub fn arguments_from_value(value: &Value) -> ToolArguments {
    match value {
        Value::Object(map) => map.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            _ => ToolArguments::new(),
        },
        _ => ToolArguments::new(),
    }
}

/// Reconcile one pass of inputs into canonical records.
///
/// `start_times` is the caller's cache for the current run and `now_ms` the
/// wall clock used for calls first seen in this pass.
pub fn reconcile(
    input: &ReconcileInput,
    start_times: &mut RunningStartTimes,
    now_ms: i64,
) -> Vec<ToolCallRecord> {
    // Step 1: index declarations. First appearance fixes order, later
    // declarations of the same id refresh the content.
    let mut declared: HashMap<&str, DeclaredCall<'_>> = HashMap::new();
    let mut declared_order: Vec<&str> = Vec::new();
    for (decl, created_at) in input.declarations() {
        let id = decl.call_id.as_str();
        if !declared.contains_key(id) {
            declared_order.push(id);
        }
        declared.insert(id, DeclaredCall::from_declaration(decl, created_at));
    }

    let feeds = &input.feeds;
    let mut records: Vec<ToolCallRecord> = Vec::new();
    let mut processed: HashSet<&str> = HashSet::new();

    // Step 2: persisted results are authoritative.
    for result in input.tool_results() {
        let id = result.tool_call_id.as_str();
        if !processed.insert(id) {
            trace!(target: "toolboard::reconcile", "Duplicate persisted result for {}, keeping first", id);
            continue;
        }

        let (name, arguments) = match declared.get(id) {
            Some(decl) => (decl.name.to_string(), decl.arguments.clone()),
            None => {
                debug!(target: "toolboard::reconcile", "No declaration for persisted result {}", id);
                (UNKNOWN_TOOL_NAME.to_string(), ToolArguments::new())
            }
        };

        let live = feeds.tool_results.get(id);
        let live_metadata = live
            .map(|event| ToolMetadata::from_value(&event.result_metadata))
            .filter(|meta| !meta.is_none());
        let result_metadata =
            live_metadata.unwrap_or_else(|| ToolMetadata::from_value(&result.result_metadata));
        let full_output = live
            .and_then(|event| event.output.clone())
            .or_else(|| result.content.clone());

        let status = if result.tool_success {
            ToolStatus::Completed
        } else {
            ToolStatus::Error
        };

        let mut record = ToolCallRecord::new(id, name, status, result.created_at);
        record.arguments = arguments;
        record.result_metadata = result_metadata;
        record.full_output = full_output;
        records.push(record);
    }

    // Step 3: executing feed.
    for (id, exec) in &feeds.executing_tools {
        let id = id.as_str();
        if !processed.insert(id) {
            trace!(target: "toolboard::reconcile", "Ignoring stale executing entry for {}", id);
            continue;
        }
        let record = live_record(
            id,
            &exec.name,
            &exec.arguments,
            declared.get(id),
            ToolStatus::Running,
            exec.started_at,
        );
        records.push(record);
    }

    // Step 4: queued feed.
    for queued in &feeds.queued_tools {
        let id = queued.call_id.as_str();
        if !processed.insert(id) {
            trace!(target: "toolboard::reconcile", "Ignoring queued entry for already resolved {}", id);
            continue;
        }
        let mut record = live_record(
            id,
            &queued.name,
            &queued.arguments,
            declared.get(id),
            ToolStatus::Queued,
            queued.queued_at,
        );
        record.queue_position = Some(queued.queue_position);
        records.push(record);
    }

    // Step 5: pending-approval feed.
    for pending in &feeds.pending_tools {
        let id = pending.call_id.as_str();
        if !processed.insert(id) {
            trace!(target: "toolboard::reconcile", "Ignoring pending entry for already resolved {}", id);
            continue;
        }
        let decl = declared.get(id);
        let start_time = pending
            .requested_at
            .or_else(|| decl.and_then(|d| d.created_at))
            .unwrap_or(now_ms);
        let record = live_record(
            id,
            &pending.name,
            &pending.arguments,
            decl,
            ToolStatus::Pending,
            start_time,
        );
        records.push(record);
    }

    // Step 6: while the run is active, unreported declarations are running.
    let mut assumed: HashSet<&str> = HashSet::new();
    if input.is_running {
        for id in &declared_order {
            if processed.contains(id) {
                continue;
            }
            let Some(decl) = declared.get(id) else {
                continue;
            };
            let start_time = start_times.get_or_insert(id, now_ms);
            let mut record = ToolCallRecord::new(*id, decl.name, ToolStatus::Running, start_time);
            record.arguments = decl.arguments.clone();
            record.partial_args_json = decl.partial_args_json.map(str::to_string);
            records.push(record);
            assumed.insert(*id);
        }
    }

    // Step 7: calls with concrete state no longer need an assumed start.
    if input.is_running {
        let evicted = start_times.retain(|id| assumed.contains(id));
        if evicted > 0 {
            trace!(target: "toolboard::reconcile", "Evicted {} running start times", evicted);
        }
    } else if !start_times.is_empty() {
        trace!(target: "toolboard::reconcile", "Run inactive, clearing {} running start times", start_times.len());
        start_times.clear();
    }

    if tracing::enabled!(target: "toolboard::reconcile", tracing::Level::DEBUG) {
        let mut counts = StatusCounts::default();
        for record in &records {
            counts.record(record.status);
        }
        debug!(
            target: "toolboard::reconcile",
            "Reconciled {} records (running={}, queued={}, pending={}, completed={}, error={}, cached_starts={})",
            records.len(),
            counts.running,
            counts.queued,
            counts.pending,
            counts.completed,
            counts.error,
            start_times.len()
        );
    }

    records
}

/// Build a non-terminal record from a real-time feed entry.
fn live_record(
    id: &str,
    feed_name: &str,
    feed_arguments: &Value,
    decl: Option<&DeclaredCall<'_>>,
    status: ToolStatus,
    start_time: i64,
) -> ToolCallRecord {
    let name = if feed_name.trim().is_empty() {
        decl.map(|d| d.name).unwrap_or(UNKNOWN_TOOL_NAME)
    } else {
        feed_name
    };

    let feed_args = arguments_from_value(feed_arguments);
    let arguments = if feed_args.is_empty() {
        decl.map(|d| d.arguments.clone()).unwrap_or_default()
    } else {
        feed_args
    };

    let mut record = ToolCallRecord::new(id, name, status, start_time);
    record.arguments = arguments;
    record.partial_args_json = decl.and_then(|d| d.partial_args_json).map(str::to_string);
    record
}
