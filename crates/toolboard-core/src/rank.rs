//! Display ordering of tool records.
//!
//! Active work surfaces first: running, queued, pending, then error and
//! completed history. Within running/queued the newest start comes first;
//! every other status keeps chronological order.

use std::cmp::Ordering;
use toolboard_types::{ToolCallRecord, ToolStatus};

/// Priority rank of a status, lower sorts first. `None` for unranked statuses.
pub fn status_rank(status: ToolStatus) -> Option<u8> {
    match status {
        ToolStatus::Running => Some(0),
        ToolStatus::Queued => Some(1),
        ToolStatus::Pending => Some(2),
        ToolStatus::Error => Some(3),
        ToolStatus::Completed => Some(4),
        ToolStatus::Unknown => None,
    }
}

/// Compare two records for display.
pub fn compare_records(a: &ToolCallRecord, b: &ToolCallRecord) -> Ordering {
    let rank_a = status_rank(a.status).unwrap_or(u8::MAX);
    let rank_b = status_rank(b.status).unwrap_or(u8::MAX);

    rank_a.cmp(&rank_b).then_with(|| {
        if newest_first(a.status) && a.status == b.status {
            b.start_time.cmp(&a.start_time)
        } else {
            a.start_time.cmp(&b.start_time)
        }
    })
}

fn newest_first(status: ToolStatus) -> bool {
    matches!(status, ToolStatus::Running | ToolStatus::Queued)
}

/// Sort records for display. Stable: full ties keep their input order.
pub fn rank_records(mut records: Vec<ToolCallRecord>) -> Vec<ToolCallRecord> {
    records.sort_by(compare_records);
    records
}
