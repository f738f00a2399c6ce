//! Human-readable action descriptions for tool calls.
//!
//! Resolution order:
//! 1. Known tools from a static table, with per-status verbs and an optional
//!    context extractor ("Reading config.ts", "Ran cargo test")
//! 2. `browser_`, `lsp_` and `mcp_` prefixed tools, phrased from the suffix
//!    ("Performing click")
//! 3. Anything else: "<verb> <tool name as words>"
//!
//! Context comes from the structured arguments when present, otherwise from
//! the argument JSON that is still streaming in.

use crate::partial_json::partial_string_field;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use toolboard_types::{ActionCategory, ActionDescription, ToolArguments, ToolCallRecord, ToolStatus};
use tracing::trace;

/// Argument keys holding a file path.
pub const FILE_PATH_KEYS: &[&str] = &[
    "path",
    "file_path",
    "filePath",
    "target_file",
    "filename",
    "notebook_path",
];
const COMMAND_KEYS: &[&str] = &["command", "cmd", "script"];
const PATTERN_KEYS: &[&str] = &["pattern", "query", "regex", "search", "glob"];
const URL_KEYS: &[&str] = &["url", "uri", "href"];
const DIRECTORY_KEYS: &[&str] = &["path", "directory", "dir", "dir_path", "target_directory"];

/// Truncation limits for extracted context (in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribeLimits {
    /// Longest shell command shown before truncating.
    pub command_max_chars: usize,
    /// Commands longer than this show only their first token.
    pub command_first_token_threshold: usize,
    /// Longest search pattern shown before truncating.
    pub pattern_max_chars: usize,
    /// Longest raw URL shown when it has no parseable host.
    pub url_max_chars: usize,
}

impl Default for DescribeLimits {
    fn default() -> Self {
        Self {
            command_max_chars: 60,
            command_first_token_threshold: 200,
            pattern_max_chars: 30,
            url_max_chars: 40,
        }
    }
}

/// Verb phrase for each status.
#[derive(Debug, Clone, Copy)]
struct StatusVerbs {
    queued: &'static str,
    pending: &'static str,
    running: &'static str,
    completed: &'static str,
    error: &'static str,
}

impl StatusVerbs {
    const fn new(
        queued: &'static str,
        pending: &'static str,
        running: &'static str,
        completed: &'static str,
        error: &'static str,
    ) -> Self {
        Self {
            queued,
            pending,
            running,
            completed,
            error,
        }
    }

    fn for_status(&self, status: ToolStatus) -> &'static str {
        match status {
            ToolStatus::Queued => self.queued,
            ToolStatus::Pending => self.pending,
            ToolStatus::Running | ToolStatus::Unknown => self.running,
            ToolStatus::Completed => self.completed,
            ToolStatus::Error => self.error,
        }
    }
}

/// Which argument a tool's context comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextKind {
    FilePath,
    Command,
    Pattern,
    Url,
    Directory,
}

#[derive(Debug, Clone, Copy)]
struct ToolDescriptor {
    verbs: StatusVerbs,
    category: ActionCategory,
    context: Option<ContextKind>,
}

const READ: StatusVerbs = StatusVerbs::new("Queued read", "Awaiting approval to read", "Reading", "Read", "Failed to read");
const WRITE: StatusVerbs = StatusVerbs::new("Queued write", "Awaiting approval to write", "Writing", "Wrote", "Failed to write");
const CREATE: StatusVerbs = StatusVerbs::new("Queued create", "Awaiting approval to create", "Creating", "Created", "Failed to create");
const EDIT: StatusVerbs = StatusVerbs::new("Queued edit", "Awaiting approval to edit", "Editing", "Edited", "Failed to edit");
const PATCH: StatusVerbs = StatusVerbs::new("Queued patch", "Awaiting approval to apply patch", "Applying patch", "Applied patch", "Failed to apply patch");
const LIST: StatusVerbs = StatusVerbs::new("Queued listing", "Awaiting approval to list", "Listing", "Listed", "Failed to list");
const SEARCH: StatusVerbs = StatusVerbs::new("Queued search for", "Awaiting approval to search for", "Searching for", "Searched for", "Search failed for");
const GLOB: StatusVerbs = StatusVerbs::new("Queued file search", "Awaiting approval to find files", "Finding files", "Found files", "Failed to find files");
const SHELL: StatusVerbs = StatusVerbs::new("Queued command", "Awaiting approval to run", "Running", "Ran", "Failed to run");
const FETCH: StatusVerbs = StatusVerbs::new("Queued fetch", "Awaiting approval to fetch", "Fetching", "Fetched", "Failed to fetch");
const WEB_SEARCH: StatusVerbs = StatusVerbs::new("Queued web search", "Awaiting approval to search the web for", "Searching the web for", "Searched the web for", "Web search failed for");
const TODO: StatusVerbs = StatusVerbs::new("Queued todo update", "Awaiting approval to update todos", "Updating todos", "Updated todos", "Failed to update todos");
const TASK: StatusVerbs = StatusVerbs::new("Queued task", "Awaiting approval to start task", "Running task", "Finished task", "Task failed");

static TOOL_TABLE: Lazy<HashMap<&'static str, ToolDescriptor>> = Lazy::new(|| {
    use ActionCategory as C;
    use ContextKind as K;

    let entries: [(&[&str], StatusVerbs, ActionCategory, Option<ContextKind>); 13] = [
        (&["read", "read_file", "view"], READ, C::File, Some(K::FilePath)),
        (&["write", "write_file"], WRITE, C::File, Some(K::FilePath)),
        (&["create_file"], CREATE, C::File, Some(K::FilePath)),
        (&["edit", "edit_file", "multiedit", "str_replace", "notebookedit"], EDIT, C::File, Some(K::FilePath)),
        (&["apply_patch"], PATCH, C::File, None),
        (&["ls", "list_directory", "list_dir"], LIST, C::File, Some(K::Directory)),
        (&["search", "grep", "search_files"], SEARCH, C::Search, Some(K::Pattern)),
        (&["glob", "find_files"], GLOB, C::Search, Some(K::Pattern)),
        (&["bash", "shell", "run_command", "execute_command", "terminal"], SHELL, C::Shell, Some(K::Command)),
        (&["web_fetch", "webfetch", "fetch_url", "fetch"], FETCH, C::Web, Some(K::Url)),
        (&["web_search", "websearch"], WEB_SEARCH, C::Web, Some(K::Pattern)),
        (&["todo_write", "todowrite"], TODO, C::Task, None),
        (&["task", "agent"], TASK, C::Task, None),
    ];

    let mut table = HashMap::new();
    for (names, verbs, category, context) in entries {
        for name in names {
            table.insert(
                *name,
                ToolDescriptor {
                    verbs,
                    category,
                    context,
                },
            );
        }
    }
    table
});

/// Tool-name prefixes phrased from their suffix.
const PREFIX_FAMILIES: &[(&str, StatusVerbs, ActionCategory)] = &[
    (
        "browser_",
        StatusVerbs::new("Queued", "Awaiting approval to perform", "Performing", "Performed", "Failed to perform"),
        ActionCategory::Browser,
    ),
    (
        "lsp_",
        StatusVerbs::new("Queued", "Awaiting approval to query", "Querying", "Queried", "Failed to query"),
        ActionCategory::Lsp,
    ),
    (
        "mcp_",
        StatusVerbs::new("Queued", "Awaiting approval to call", "Calling", "Called", "Failed to call"),
        ActionCategory::Mcp,
    ),
];

const GENERIC: StatusVerbs = StatusVerbs::new("Queued", "Awaiting approval for", "Running", "Ran", "Failed");

/// Resolves descriptions with configurable truncation limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionDescriber {
    limits: DescribeLimits,
}

impl ActionDescriber {
    pub fn new(limits: DescribeLimits) -> Self {
        Self { limits }
    }

    /// Resolve the description of a call.
    pub fn resolve(
        &self,
        name: &str,
        status: ToolStatus,
        arguments: &ToolArguments,
        partial_json: Option<&str>,
    ) -> ActionDescription {
        let normalized = name.trim().to_lowercase();

        if let Some(descriptor) = TOOL_TABLE.get(normalized.as_str()) {
            let context = descriptor
                .context
                .and_then(|kind| self.extract_context(kind, arguments, partial_json));
            return ActionDescription {
                verb: descriptor.verbs.for_status(status).to_string(),
                context,
                category: descriptor.category,
            };
        }

        for (prefix, verbs, category) in PREFIX_FAMILIES {
            if let Some(suffix) = normalized.strip_prefix(prefix) {
                let action = humanize_tool_name(suffix);
                if action.is_empty() {
                    break;
                }
                return ActionDescription {
                    verb: format!("{} {}", verbs.for_status(status), action),
                    context: None,
                    category: *category,
                };
            }
        }

        trace!(target: "toolboard::describe", "No descriptor for tool '{}', using generic phrasing", name);
        let words = humanize_tool_name(name);
        let words = if words.is_empty() { "tool".to_string() } else { words };
        ActionDescription {
            verb: format!("{} {}", GENERIC.for_status(status), words),
            context: None,
            category: ActionCategory::Other,
        }
    }

    /// Description text of a call.
    pub fn describe(
        &self,
        name: &str,
        status: ToolStatus,
        arguments: &ToolArguments,
        partial_json: Option<&str>,
    ) -> String {
        self.resolve(name, status, arguments, partial_json).to_string()
    }

    /// Resolve the description of a reconciled record.
    pub fn describe_record(&self, record: &ToolCallRecord) -> ActionDescription {
        self.resolve(
            &record.name,
            record.status,
            &record.arguments,
            record.partial_args_json.as_deref(),
        )
    }

    fn extract_context(
        &self,
        kind: ContextKind,
        arguments: &ToolArguments,
        partial_json: Option<&str>,
    ) -> Option<String> {
        let keys = match kind {
            ContextKind::FilePath => FILE_PATH_KEYS,
            ContextKind::Command => COMMAND_KEYS,
            ContextKind::Pattern => PATTERN_KEYS,
            ContextKind::Url => URL_KEYS,
            ContextKind::Directory => DIRECTORY_KEYS,
        };

        let raw = string_argument(arguments, keys).or_else(|| {
            let partial = partial_json?;
            let value = partial_string_field(partial, keys);
            if value.is_some() {
                trace!(target: "toolboard::describe", "Context taken from streaming arguments");
            }
            value
        });

        match (kind, raw) {
            (ContextKind::FilePath, Some(raw)) => file_name(&raw),
            (ContextKind::Command, Some(raw)) => format_command(&raw, &self.limits),
            (ContextKind::Pattern, Some(raw)) => Some(format_pattern(&raw, &self.limits)),
            (ContextKind::Url, Some(raw)) => Some(format_url(&raw, &self.limits)),
            (ContextKind::Directory, raw) => Some(
                raw.as_deref()
                    .and_then(file_name)
                    .unwrap_or_else(|| ".".to_string()),
            ),
            (_, None) => None,
        }
    }
}

/// Describe a call with default limits.
pub fn describe(
    name: &str,
    status: ToolStatus,
    arguments: &ToolArguments,
    partial_json: Option<&str>,
) -> String {
    ActionDescriber::default().describe(name, status, arguments, partial_json)
}

/// Category of a tool name as the description table sees it.
pub fn action_category(name: &str) -> ActionCategory {
    ActionDescriber::default()
        .resolve(name, ToolStatus::Running, &ToolArguments::new(), None)
        .category
}

/// First non-blank string argument among `keys`.
pub fn string_argument(arguments: &ToolArguments, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        arguments
            .get(*key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
    })
}

/// Last path segment, for either separator style.
fn file_name(path: &str) -> Option<String> {
    let trimmed = path.trim().trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn format_command(raw: &str, limits: &DescribeLimits) -> Option<String> {
    let command = raw.lines().map(str::trim).find(|line| !line.is_empty())?;

    if raw.chars().count() > limits.command_first_token_threshold {
        let first = command.split_whitespace().next()?;
        return Some(truncate_chars(first, limits.command_max_chars));
    }
    Some(truncate_chars(command, limits.command_max_chars))
}

fn format_pattern(raw: &str, limits: &DescribeLimits) -> String {
    format!("\"{}\"", truncate_chars(raw, limits.pattern_max_chars))
}

fn format_url(raw: &str, limits: &DescribeLimits) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => truncate_chars(raw, limits.url_max_chars),
        },
        Err(_) => truncate_chars(raw, limits.url_max_chars),
    }
}

/// Truncate to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// "totally_unknown_tool" / "fetchWeather" -> "totally unknown tool" / "fetch weather".
pub fn humanize_tool_name(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.trim().chars() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> ToolArguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_read_with_path() {
        let text = describe("read", ToolStatus::Running, &args(json!({"path": "/a/b/config.ts"})), None);
        assert_eq!(text, "Reading config.ts");
    }

    #[test]
    fn test_tool_name_case_insensitive() {
        let text = describe("Read", ToolStatus::Completed, &args(json!({"file_path": "src/lib.rs"})), None);
        assert_eq!(text, "Read lib.rs");
    }

    #[test]
    fn test_verb_per_status() {
        let a = args(json!({"path": "notes.md"}));
        assert_eq!(describe("write", ToolStatus::Queued, &a, None), "Queued write notes.md");
        assert_eq!(describe("write", ToolStatus::Pending, &a, None), "Awaiting approval to write notes.md");
        assert_eq!(describe("write", ToolStatus::Running, &a, None), "Writing notes.md");
        assert_eq!(describe("write", ToolStatus::Completed, &a, None), "Wrote notes.md");
        assert_eq!(describe("write", ToolStatus::Error, &a, None), "Failed to write notes.md");
    }

    #[test]
    fn test_missing_context_gives_bare_verb() {
        assert_eq!(describe("edit", ToolStatus::Running, &ToolArguments::new(), None), "Editing");
        assert_eq!(describe("todo_write", ToolStatus::Completed, &ToolArguments::new(), None), "Updated todos");
    }

    #[test]
    fn test_partial_json_fallback() {
        let text = describe(
            "edit",
            ToolStatus::Running,
            &ToolArguments::new(),
            Some(r#"{"file_path": "/src/components/Button.tsx", "old_str"#),
        );
        assert_eq!(text, "Editing Button.tsx");
    }

    #[test]
    fn test_structured_arguments_win_over_partial() {
        let text = describe(
            "read",
            ToolStatus::Running,
            &args(json!({"path": "/final.rs"})),
            Some(r#"{"path": "/streaming.rs"#),
        );
        assert_eq!(text, "Reading final.rs");
    }

    #[test]
    fn test_malformed_partial_json_has_no_context() {
        let text = describe("read", ToolStatus::Running, &ToolArguments::new(), Some("}}{{ not json"));
        assert_eq!(text, "Reading");
    }

    #[test]
    fn test_shell_command_truncation() {
        let short = describe("bash", ToolStatus::Running, &args(json!({"command": "cargo test"})), None);
        assert_eq!(short, "Running cargo test");

        let long_cmd = format!("echo {}", "x".repeat(80));
        let long = describe("bash", ToolStatus::Completed, &args(json!({"command": long_cmd})), None);
        assert!(long.starts_with("Ran echo xxx"));
        assert!(long.ends_with("..."));
        assert_eq!(long.chars().count(), "Ran ".len() + 60);

        let huge_cmd = format!("python3 -c '{}'", "y".repeat(300));
        let huge = describe("bash", ToolStatus::Running, &args(json!({"command": huge_cmd})), None);
        assert_eq!(huge, "Running python3");
    }

    #[test]
    fn test_shell_error_phrasing() {
        let failed = describe("bash", ToolStatus::Error, &args(json!({"command": "make"})), None);
        assert_eq!(failed, "Failed to run make");

        let bare = describe("bash", ToolStatus::Error, &ToolArguments::new(), None);
        assert_eq!(bare, "Failed to run");
    }

    #[test]
    fn test_deeply_nested_partial_json_has_no_context() {
        let partial = format!("{{\"x\": {}", "[".repeat(20_000));
        let text = describe("read", ToolStatus::Running, &ToolArguments::new(), Some(&partial));
        assert_eq!(text, "Reading");
    }

    #[test]
    fn test_multiline_command_uses_first_line() {
        let text = describe("shell", ToolStatus::Running, &args(json!({"command": "\n  cd app\nnpm test"})), None);
        assert_eq!(text, "Running cd app");
    }

    #[test]
    fn test_search_pattern_quoted_and_truncated() {
        let text = describe("grep", ToolStatus::Running, &args(json!({"pattern": "TODO"})), None);
        assert_eq!(text, "Searching for \"TODO\"");

        let long = describe("search", ToolStatus::Completed, &args(json!({"query": "a".repeat(50)})), None);
        assert_eq!(long, format!("Searched for \"{}...\"", "a".repeat(27)));
    }

    #[test]
    fn test_url_prefers_host() {
        let text = describe("web_fetch", ToolStatus::Running, &args(json!({"url": "https://docs.rs/serde/latest"})), None);
        assert_eq!(text, "Fetching docs.rs");

        let bad = describe("web_fetch", ToolStatus::Running, &args(json!({"url": "not a url at all"})), None);
        assert_eq!(bad, "Fetching not a url at all");
    }

    #[test]
    fn test_directory_defaults_to_dot() {
        assert_eq!(describe("ls", ToolStatus::Running, &ToolArguments::new(), None), "Listing .");
        assert_eq!(
            describe("list_directory", ToolStatus::Completed, &args(json!({"path": "/repo/src/"})), None),
            "Listed src"
        );
    }

    #[test]
    fn test_prefix_families() {
        let empty = ToolArguments::new();
        assert_eq!(describe("browser_click", ToolStatus::Running, &empty, None), "Performing click");
        assert_eq!(describe("browser_take_screenshot", ToolStatus::Completed, &empty, None), "Performed take screenshot");
        assert_eq!(describe("lsp_hover", ToolStatus::Running, &empty, None), "Querying hover");
        assert_eq!(describe("mcp_github_create_issue", ToolStatus::Error, &empty, None), "Failed to call github create issue");
    }

    #[test]
    fn test_unknown_tool_fallback() {
        let text = describe("totally_unknown_tool", ToolStatus::Running, &ToolArguments::new(), None);
        assert!(!text.is_empty());
        assert!(text.contains("totally unknown tool"));
    }

    #[test]
    fn test_empty_name_still_describes() {
        assert_eq!(describe("", ToolStatus::Completed, &ToolArguments::new(), None), "Ran tool");
        assert_eq!(describe("browser_", ToolStatus::Running, &ToolArguments::new(), None), "Running browser");
    }

    #[test]
    fn test_humanize_tool_name() {
        assert_eq!(humanize_tool_name("totally_unknown_tool"), "totally unknown tool");
        assert_eq!(humanize_tool_name("fetchWeatherData"), "fetch weather data");
        assert_eq!(humanize_tool_name("mcp__server__do-thing"), "mcp server do thing");
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_custom_limits() {
        let describer = ActionDescriber::new(DescribeLimits {
            pattern_max_chars: 6,
            ..Default::default()
        });
        let text = describer.describe("grep", ToolStatus::Running, &args(json!({"pattern": "abcdefghij"})), None);
        assert_eq!(text, "Searching for \"abc...\"");
    }

    #[test]
    fn test_categories() {
        assert_eq!(action_category("bash"), ActionCategory::Shell);
        assert_eq!(action_category("browser_click"), ActionCategory::Browser);
        assert_eq!(action_category("mystery"), ActionCategory::Other);
    }
}
