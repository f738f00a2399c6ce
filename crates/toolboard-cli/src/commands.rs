//! Subcommand implementations.

use crate::config::Config;
use crate::render::{render, render_file_diff, OutputFormat};
use anyhow::{bail, Context, Result};
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use toolboard_core::{
    action_category, arguments_from_value, build_view, file_target, load_snapshot, now_ms, reconcile,
    record_diff, record_unified_diff, ActionDescriber, RunningStartTimes, SnapshotEvent, SnapshotWatcher,
};
use toolboard_types::{ReconcileInput, ToolStatus};
use tracing::{debug, info, warn};

/// Render a snapshot file once.
pub fn render_snapshot(path: &Path, format: OutputFormat, config: &Config, now_ms: i64) -> Result<String> {
    let input = load_snapshot(path).with_context(|| format!("Failed to load snapshot {}", path.display()))?;
    // A one-shot render has no earlier pass to share start times with.
    let mut start_times = RunningStartTimes::new();
    render_input(&input, &mut start_times, format, config, now_ms)
}

fn render_input(
    input: &ReconcileInput,
    start_times: &mut RunningStartTimes,
    format: OutputFormat,
    config: &Config,
    now_ms: i64,
) -> Result<String> {
    let describer = ActionDescriber::new(config.limits);
    let view = build_view(input, start_times, now_ms, &describer);
    debug!(
        target: "toolboard::cli",
        "Rendered {} groups ({} records)",
        view.groups.len(),
        view.counts.total()
    );
    render(&view, format)
}

/// Exact line diff of one file-operation call in a snapshot.
///
/// `unified` selects `diff -u` style text; otherwise the hunks are rendered
/// in `format`.
pub fn diff_call(
    path: &Path,
    call_id: &str,
    unified: bool,
    context_lines: usize,
    format: OutputFormat,
    now_ms: i64,
) -> Result<String> {
    let input = load_snapshot(path).with_context(|| format!("Failed to load snapshot {}", path.display()))?;
    let records = reconcile(&input, &mut RunningStartTimes::new(), now_ms);
    let Some(record) = records.iter().find(|record| record.call_id == call_id) else {
        bail!("No tool call '{}' in {}", call_id, path.display());
    };

    let target = file_target(record, action_category(&record.name)).unwrap_or_else(|| call_id.to_string());
    debug!(target: "toolboard::cli", "Diffing {} ({})", call_id, target);

    let output = if unified {
        record_unified_diff(record, &target, context_lines)
    } else {
        match record_diff(record, context_lines) {
            Some(diff) => Some(render_file_diff(&target, &diff, format)?),
            None => None,
        }
    };
    output.with_context(|| format!("Tool call '{}' has no file changes", call_id))
}

/// Describe a single tool call from the command line.
pub fn describe_tool(
    tool: &str,
    status: ToolStatus,
    args: Option<&str>,
    partial: Option<&str>,
    config: &Config,
) -> Result<String> {
    let arguments = match args {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).context("--args must be a JSON object")?;
            if !value.is_object() {
                bail!("--args must be a JSON object");
            }
            arguments_from_value(&value)
        }
        None => Default::default(),
    };

    Ok(ActionDescriber::new(config.limits).describe(tool, status, &arguments, partial))
}

/// Re-render a snapshot on every change until interrupted.
///
/// While the snapshot reports an active run the view is also refreshed once
/// a second so elapsed times keep moving.
pub async fn watch_snapshot(path: &Path, format: OutputFormat, config: &Config) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let watcher = SnapshotWatcher::new(
        path.to_path_buf(),
        Duration::from_millis(config.watch_debounce_ms),
        tx,
    );
    let handle = watcher
        .start()
        .with_context(|| format!("Failed to watch {}", path.display()))?;
    info!(target: "toolboard::watch", "Watching {} (Ctrl-C to stop)", path.display());

    // One cache for the whole watch so assumed-running start times stay stable.
    let mut start_times = RunningStartTimes::new();
    let mut current: Option<ReconcileInput> = None;
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let clear_screen = format == OutputFormat::Text && std::io::stdout().is_terminal();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(SnapshotEvent::Updated(input)) => {
                    current = Some(*input);
                }
                Some(SnapshotEvent::Invalid(reason)) => {
                    warn!(target: "toolboard::watch", "Keeping previous snapshot: {}", reason);
                    continue;
                }
                None => break,
            },
            _ = ticker.tick() => {
                if !current.as_ref().is_some_and(|input| input.is_running) {
                    continue;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!(target: "toolboard::watch", "Interrupted, stopping watch");
                break;
            }
        }

        let Some(input) = current.as_ref() else {
            continue;
        };
        let output = render_input(input, &mut start_times, format, config, now_ms())?;

        let mut stdout = std::io::stdout().lock();
        if clear_screen {
            write!(stdout, "\x1b[2J\x1b[H")?;
        }
        writeln!(stdout, "{}", output)?;
        stdout.flush()?;
    }

    handle.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_tool_with_args() {
        let text = describe_tool(
            "read",
            ToolStatus::Running,
            Some(r#"{"path": "/a/b/config.ts"}"#),
            None,
            &Config::default(),
        )
        .unwrap();
        assert_eq!(text, "Reading config.ts");
    }

    #[test]
    fn test_describe_tool_rejects_non_object_args() {
        let err = describe_tool("read", ToolStatus::Running, Some("[1]"), None, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_diff_unknown_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, r#"{"messages": []}"#).unwrap();

        let err = diff_call(&path, "nope", false, 3, OutputFormat::Text, 0).unwrap_err();
        assert!(err.to_string().contains("No tool call 'nope'"));
    }

    #[test]
    fn test_render_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_snapshot(&dir.path().join("nope.json"), OutputFormat::Text, &Config::default(), 0)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load snapshot"));
    }
}
