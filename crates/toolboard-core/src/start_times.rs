//! Start times for calls that are only assumed to be running.
//!
//! When a run is active but no feed has reported a declared call yet, the
//! reconciler assumes it is running. The first time it does so it stamps a
//! start time here so elapsed-time displays stay stable across passes. The
//! cache is owned by the caller for the lifetime of one run.

use std::collections::HashMap;

/// Caller-owned start-time cache keyed by call id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningStartTimes {
    entries: HashMap<String, i64>,
}

impl RunningStartTimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded start for `call_id`, or record `now_ms` and return it.
    pub fn get_or_insert(&mut self, call_id: &str, now_ms: i64) -> i64 {
        if let Some(start) = self.entries.get(call_id) {
            return *start;
        }
        self.entries.insert(call_id.to_string(), now_ms);
        now_ms
    }

    pub fn get(&self, call_id: &str) -> Option<i64> {
        self.entries.get(call_id).copied()
    }

    /// Keep only entries whose call id satisfies `keep`. Returns the number removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|call_id, _| keep(call_id));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, call_id: &str) -> bool {
        self.entries.contains_key(call_id)
    }
}
