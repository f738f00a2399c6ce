//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use toolboard_types::{ReconcileInput, ToolCallRecord};

/// Path of a snapshot fixture.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("snapshots")
        .join(format!("{}.json", name))
}

/// Load a snapshot fixture from the fixtures directory.
pub fn load_snapshot_fixture(name: &str) -> ReconcileInput {
    let path = fixture_path(name);
    toolboard_core::load_snapshot(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", path.display(), e))
}

/// Call ids in record order.
pub fn ids(records: &[ToolCallRecord]) -> Vec<&str> {
    records.iter().map(|r| r.call_id.as_str()).collect()
}

/// Find a record by call id, failing the test when absent.
pub fn find<'a>(records: &'a [ToolCallRecord], call_id: &str) -> &'a ToolCallRecord {
    records
        .iter()
        .find(|r| r.call_id == call_id)
        .unwrap_or_else(|| panic!("No record for call id '{}'", call_id))
}
