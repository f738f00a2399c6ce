//! Partition ranked records into display groups.
//!
//! Only completed calls of a known category are grouped, and only when a
//! category has at least [`MIN_GROUP_SIZE`] members. Everything else is shown
//! individually, ahead of the groups, in ranked order.

use crate::diff::aggregate_file_ops;
use toolboard_types::{
    GroupKind, GroupStats, OutcomeTally, ToolCallRecord, ToolCategory, ToolGroup, ToolStatus,
};

/// Smallest number of members that forms a group.
pub const MIN_GROUP_SIZE: usize = 2;

/// Group a ranked record list.
pub fn group_records(records: Vec<ToolCallRecord>) -> Vec<ToolGroup> {
    let categories: Vec<Option<ToolCategory>> = records.iter().map(groupable_category).collect();

    // Category sizes decide up front which records leave the ungrouped list,
    // so singletons keep their ranked position.
    let mut sizes: Vec<(ToolCategory, usize)> = Vec::new();
    for category in categories.iter().flatten() {
        match sizes.iter_mut().find(|(c, _)| *c == *category) {
            Some((_, count)) => *count += 1,
            None => sizes.push((*category, 1)),
        }
    }
    let qualifies = |category: ToolCategory| {
        sizes
            .iter()
            .any(|(c, count)| *c == category && *count >= MIN_GROUP_SIZE)
    };

    let mut groups: Vec<ToolGroup> = Vec::new();
    let mut buckets: Vec<(ToolCategory, Vec<ToolCallRecord>)> = Vec::new();

    for (record, category) in records.into_iter().zip(categories) {
        match category.filter(|c| qualifies(*c)) {
            Some(category) => match buckets.iter_mut().find(|(c, _)| *c == category) {
                Some((_, members)) => members.push(record),
                None => buckets.push((category, vec![record])),
            },
            None => groups.push(ToolGroup::single(record)),
        }
    }

    groups.extend(
        buckets
            .into_iter()
            .map(|(category, members)| build_group(category, members)),
    );
    groups
}

/// Category of a record if it is eligible for grouping at all.
fn groupable_category(record: &ToolCallRecord) -> Option<ToolCategory> {
    if record.status != ToolStatus::Completed {
        return None;
    }
    ToolCategory::from_tool_name(&record.name)
}

fn build_group(category: ToolCategory, members: Vec<ToolCallRecord>) -> ToolGroup {
    match category {
        ToolCategory::FileOps => ToolGroup {
            kind: GroupKind::FileGroup,
            stats: GroupStats::Diff(aggregate_file_ops(&members)),
            members,
        },
        other => ToolGroup {
            kind: GroupKind::ToolGroup(other),
            stats: GroupStats::Tally(OutcomeTally::from_records(&members)),
            members,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, status: ToolStatus) -> ToolCallRecord {
        ToolCallRecord::new(id, name, status, 0)
    }

    #[test]
    fn test_single_member_category_stays_ungrouped() {
        let groups = group_records(vec![
            record("r1", "read", ToolStatus::Completed),
            record("b1", "bash", ToolStatus::Completed),
        ]);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.is_single()));
    }

    #[test]
    fn test_two_members_form_one_group() {
        let groups = group_records(vec![
            record("r1", "read", ToolStatus::Completed),
            record("r2", "read_file", ToolStatus::Completed),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, GroupKind::ToolGroup(ToolCategory::Read));
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(
            groups[0].stats,
            GroupStats::Tally(OutcomeTally { success_count: 2, error_count: 0 })
        );
    }

    #[test]
    fn test_non_completed_never_grouped() {
        let groups = group_records(vec![
            record("r1", "read", ToolStatus::Running),
            record("r2", "read", ToolStatus::Error),
            record("r3", "read", ToolStatus::Completed),
        ]);
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.is_single()));
    }

    #[test]
    fn test_ungrouped_first_then_groups_in_first_seen_order() {
        let groups = group_records(vec![
            record("run", "bash", ToolStatus::Running),
            record("s1", "grep", ToolStatus::Completed),
            record("w1", "write", ToolStatus::Completed),
            record("lone", "ls", ToolStatus::Completed),
            record("s2", "search", ToolStatus::Completed),
            record("w2", "edit", ToolStatus::Completed),
            record("bash", "bash", ToolStatus::Completed),
        ]);

        let shape: Vec<(GroupKind, Vec<&str>)> = groups
            .iter()
            .map(|g| (g.kind, g.members.iter().map(|m| m.call_id.as_str()).collect()))
            .collect();

        assert_eq!(
            shape,
            vec![
                (GroupKind::Single, vec!["run"]),
                (GroupKind::Single, vec!["lone"]),
                (GroupKind::Single, vec!["bash"]),
                (GroupKind::ToolGroup(ToolCategory::Search), vec!["s1", "s2"]),
                (GroupKind::FileGroup, vec!["w1", "w2"]),
            ]
        );
    }

    #[test]
    fn test_file_group_carries_diff_stats() {
        let groups = group_records(vec![
            record("w1", "write", ToolStatus::Completed),
            record("w2", "create_file", ToolStatus::Completed),
        ]);
        match groups[0].stats {
            GroupStats::Diff(stats) => {
                assert_eq!(stats.total, 2);
                assert_eq!(stats.created, 2);
            }
            other => panic!("expected diff stats, got {:?}", other),
        }
    }
}
