//! Property-based tests for reconciliation, ranking and grouping.
//!
//! Inputs draw call ids from a small pool so that the feeds overlap heavily:
//! the same id may be declared twice, executing, queued and persisted at once.

use proptest::prelude::*;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use toolboard_core::{compare_records, group_records, rank_records, reconcile, RunningStartTimes, MIN_GROUP_SIZE};
use toolboard_types::{
    AssistantMessage, ExecutingTool, PendingTool, PersistedMessage, QueuedTool, RealtimeFeeds,
    ReconcileInput, ToolCallDeclaration, ToolCategory, ToolGroup, ToolResultMessage, ToolStatus,
};

const IDS: &[&str] = &["a", "b", "c", "d", "e", "f"];
const NAMES: &[&str] = &["read", "write", "edit", "grep", "ls", "bash", "browser_click"];
const NOW: i64 = 1_000_000;

// =============================================================================
// Strategies
// =============================================================================

fn call_id() -> impl Strategy<Value = &'static str> {
    prop::sample::select(IDS)
}

fn tool_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(NAMES)
}

fn reconcile_input() -> impl Strategy<Value = ReconcileInput> {
    (
        prop::collection::vec((call_id(), tool_name()), 0..8),
        prop::collection::vec((call_id(), any::<bool>(), 0i64..10_000), 0..6),
        prop::collection::vec((call_id(), tool_name(), 0i64..10_000), 0..4),
        prop::collection::vec((call_id(), 0u32..5, 0i64..10_000), 0..4),
        prop::collection::vec(call_id(), 0..3),
        any::<bool>(),
    )
        .prop_map(|(decls, results, executing, queued, pending, is_running)| {
            let mut messages = vec![PersistedMessage::Assistant(AssistantMessage {
                content: String::new(),
                tool_calls: decls
                    .into_iter()
                    .map(|(id, name)| ToolCallDeclaration {
                        call_id: id.to_string(),
                        name: name.to_string(),
                        arguments: json!({"path": format!("/src/{}.rs", id)}),
                        partial_args_json: None,
                    })
                    .collect(),
                created_at: Some(500),
            })];
            messages.extend(results.into_iter().map(|(id, success, created_at)| {
                PersistedMessage::Tool(ToolResultMessage {
                    tool_call_id: id.to_string(),
                    tool_name: String::new(),
                    tool_success: success,
                    result_metadata: json!({}),
                    created_at,
                    content: None,
                })
            }));

            let feeds = RealtimeFeeds {
                executing_tools: executing
                    .into_iter()
                    .map(|(id, name, started_at)| {
                        (
                            id.to_string(),
                            ExecutingTool {
                                name: name.to_string(),
                                arguments: json!({}),
                                started_at,
                            },
                        )
                    })
                    .collect::<BTreeMap<_, _>>(),
                queued_tools: queued
                    .into_iter()
                    .map(|(id, queue_position, queued_at)| QueuedTool {
                        call_id: id.to_string(),
                        name: "bash".to_string(),
                        arguments: json!({}),
                        queue_position,
                        queued_at,
                    })
                    .collect(),
                pending_tools: pending
                    .into_iter()
                    .map(|id| PendingTool {
                        call_id: id.to_string(),
                        name: "bash".to_string(),
                        arguments: json!({}),
                        requested_at: None,
                    })
                    .collect(),
                tool_results: BTreeMap::new(),
            };

            ReconcileInput {
                messages,
                feeds,
                is_running,
            }
        })
}

fn completed_count(groups: &[ToolGroup], category: ToolCategory) -> usize {
    groups
        .iter()
        .flat_map(|g| g.members.iter())
        .filter(|r| r.status == ToolStatus::Completed && ToolCategory::from_tool_name(&r.name) == Some(category))
        .count()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_one_record_per_call_id(input in reconcile_input()) {
        let records = reconcile(&input, &mut RunningStartTimes::new(), NOW);
        let unique: HashSet<&str> = records.iter().map(|r| r.call_id.as_str()).collect();
        prop_assert_eq!(unique.len(), records.len());
    }

    #[test]
    fn prop_reconcile_is_idempotent(input in reconcile_input()) {
        let mut cache = RunningStartTimes::new();
        let first = reconcile(&input, &mut cache, NOW);
        let second = reconcile(&input, &mut cache, NOW);
        prop_assert_eq!(&first, &second);

        let fresh = reconcile(&input, &mut RunningStartTimes::new(), NOW);
        prop_assert_eq!(&first, &fresh);
    }

    #[test]
    fn prop_persisted_result_wins(input in reconcile_input()) {
        let records = reconcile(&input, &mut RunningStartTimes::new(), NOW);
        for result in input.tool_results() {
            let record = records.iter().find(|r| r.call_id == result.tool_call_id);
            prop_assert!(record.is_some());
            prop_assert!(record.map(|r| r.status.is_terminal()).unwrap_or(false));
        }
    }

    #[test]
    fn prop_cache_only_holds_assumed_calls(input in reconcile_input()) {
        let mut cache = RunningStartTimes::new();
        let records = reconcile(&input, &mut cache, NOW);

        if !input.is_running {
            prop_assert!(cache.is_empty());
        }
        let concrete: HashSet<&str> = input
            .tool_results()
            .map(|r| r.tool_call_id.as_str())
            .chain(input.feeds.executing_tools.keys().map(String::as_str))
            .chain(input.feeds.queued_tools.iter().map(|q| q.call_id.as_str()))
            .chain(input.feeds.pending_tools.iter().map(|p| p.call_id.as_str()))
            .collect();
        for id in IDS {
            if cache.contains(id) {
                prop_assert!(!concrete.contains(id));
                let record = records.iter().find(|r| r.call_id == *id);
                prop_assert_eq!(record.map(|r| r.status), Some(ToolStatus::Running));
            }
        }
    }

    #[test]
    fn prop_ranking_is_ordered(input in reconcile_input()) {
        let ranked = rank_records(reconcile(&input, &mut RunningStartTimes::new(), NOW));
        for pair in ranked.windows(2) {
            prop_assert_ne!(compare_records(&pair[0], &pair[1]), std::cmp::Ordering::Greater);
        }
    }

    #[test]
    fn prop_grouping_threshold(input in reconcile_input()) {
        let ranked = rank_records(reconcile(&input, &mut RunningStartTimes::new(), NOW));
        let total = ranked.len();
        let groups = group_records(ranked);

        prop_assert_eq!(groups.iter().map(|g| g.members.len()).sum::<usize>(), total);

        for category in [ToolCategory::FileOps, ToolCategory::Ls, ToolCategory::Read, ToolCategory::Search] {
            let count = completed_count(&groups, category);
            let formed: Vec<&ToolGroup> = groups.iter().filter(|g| g.category() == Some(category)).collect();
            if count >= MIN_GROUP_SIZE {
                prop_assert_eq!(formed.len(), 1);
                prop_assert_eq!(formed[0].members.len(), count);
            } else {
                prop_assert!(formed.is_empty());
            }
        }
    }
}
