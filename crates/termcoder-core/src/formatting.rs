//! Formatting utilities for tool display
//!
//! Renders tool calls and tool results as short, human-oriented lines. Output
//! is plain text tagged with a [`LineStyle`]; the terminal front end decides
//! how each style looks.

use serde_json::Value;
use std::path::Path;

use crate::tools::filesystem::resolve_path;
use crate::tools::{EDIT_FILE, LIST_FILES, READ_FILE, RUN_BASH, ToolOutput, WEB_FETCH, WEB_SEARCH, WRITE_FILE};

/// Lines of new file content previewed after a write
const WRITE_PREVIEW_LINES: usize = 8;
/// Characters of fetched content previewed after a fetch
const FETCH_PREVIEW_CHARS: usize = 200;
const URL_DISPLAY_CHARS: usize = 60;
const SEARCH_TITLE_CHARS: usize = 60;

// ============================================================================
// Text utilities
// ============================================================================

/// Cut `s` to `max` characters, appending "..." if anything was removed
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Format an integer with comma thousands separators
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Display a path as `./relative` when it lies inside `workspace`
pub fn to_relative_display(path: &Path, workspace: &Path) -> String {
    match path.strip_prefix(workspace) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => format!("./{}", rel.to_string_lossy().replace('\\', "/")),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}

/// Relative display of a raw path string as given by the model
fn display_arg_path(raw: &str, workspace: &Path) -> String {
    to_relative_display(&resolve_path(raw, workspace), workspace)
}

fn count_lines(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.matches('\n').count() + 1
    }
}

// ============================================================================
// Tool call display
// ============================================================================

/// One-line summary of a tool call, shown before it is dispatched
pub fn format_tool_call(tool_name: &str, args: &Value, workspace: &Path) -> String {
    let arg = |key: &str| args.get(key).and_then(Value::as_str);

    match tool_name {
        WRITE_FILE => {
            let path = arg("path").map(|p| display_arg_path(p, workspace)).unwrap_or_else(|| "?".into());
            let lines = count_lines(arg("content").unwrap_or(""));
            format!("[Write] {} ({} lines)", path, lines)
        }
        EDIT_FILE => {
            let path = arg("path").map(|p| display_arg_path(p, workspace)).unwrap_or_else(|| "?".into());
            format!("[Edit] {}", path)
        }
        READ_FILE => {
            let path = arg("filename").map(|p| display_arg_path(p, workspace)).unwrap_or_else(|| "?".into());
            format!("[Read] {}", path)
        }
        LIST_FILES => format!("[List] {}", display_arg_path(arg("path").unwrap_or("."), workspace)),
        RUN_BASH => format!("Bash({})", arg("command").unwrap_or("?")),
        WEB_SEARCH => {
            let max = args.get("max_results").and_then(Value::as_i64).unwrap_or(5);
            format!("[Search] \"{}\" (max {})", arg("query").unwrap_or("?"), max)
        }
        WEB_FETCH => {
            let url = arg("url").unwrap_or("?");
            if url.chars().count() > URL_DISPLAY_CHARS {
                format!("[Fetch] {}", truncate_chars(url, URL_DISPLAY_CHARS - 3))
            } else {
                format!("[Fetch] {}", url)
            }
        }
        _ => format!("[{}] {}", tool_name, args),
    }
}

// ============================================================================
// Tool result display
// ============================================================================

/// Visual role of a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Normal,
    Dim,
    Error,
    Removed,
    Added,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub style: LineStyle,
    pub text: String,
}

impl StyledLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    fn normal(text: impl Into<String>) -> Self {
        Self::new(LineStyle::Normal, text)
    }
}

/// Multi-line summary of a tool result, shown after dispatch
///
/// `args` are the arguments the call was made with; they supply the write
/// preview and the edit diff.
pub fn format_tool_result(tool_name: &str, output: &ToolOutput, args: &Value, workspace: &Path) -> Vec<StyledLine> {
    if output.blocked {
        let reason = output.reason.as_deref().unwrap_or("Unknown reason");
        return vec![
            StyledLine::new(LineStyle::Error, "BLOCKED - DANGEROUS COMMAND"),
            StyledLine::new(LineStyle::Error, format!("  └ {}", reason)),
        ];
    }
    if let Some(error) = &output.error {
        return vec![StyledLine::new(LineStyle::Error, format!("Error: {}", error))];
    }

    let path_of = |key: &str| {
        output
            .get_str(key)
            .map(|p| to_relative_display(Path::new(p), workspace))
            .unwrap_or_else(|| "?".to_string())
    };

    match tool_name {
        WRITE_FILE => {
            let mut lines = vec![StyledLine::normal(format!("Created {}", path_of("path")))];
            if let Some(content) = args.get("content").and_then(Value::as_str) {
                let all: Vec<&str> = content.split('\n').collect();
                for line in all.iter().take(WRITE_PREVIEW_LINES) {
                    lines.push(StyledLine::new(LineStyle::Dim, format!("    {}", line)));
                }
                if all.len() > WRITE_PREVIEW_LINES {
                    lines.push(StyledLine::new(LineStyle::Dim, "    ..."));
                }
            }
            lines
        }
        EDIT_FILE => {
            let mut lines = vec![StyledLine::normal(format!("Edited {}", path_of("path")))];
            let old_text = args.get("old_text").and_then(Value::as_str);
            let new_text = args.get("new_text").and_then(Value::as_str);
            if let (Some(old_text), Some(new_text)) = (old_text, new_text) {
                lines.extend(
                    old_text
                        .split('\n')
                        .map(|l| StyledLine::new(LineStyle::Removed, format!("    - {}", l))),
                );
                lines.extend(
                    new_text
                        .split('\n')
                        .map(|l| StyledLine::new(LineStyle::Added, format!("    + {}", l))),
                );
            }
            lines
        }
        READ_FILE => {
            let count = count_lines(output.get_str("content").unwrap_or(""));
            vec![StyledLine::normal(format!("Read {} lines from {}", count, path_of("file_path")))]
        }
        LIST_FILES => {
            let count = output.get("items").and_then(Value::as_array).map_or(0, Vec::len);
            vec![StyledLine::normal(format!("Found {} items in {}", count, path_of("path")))]
        }
        RUN_BASH => format_bash_result(output),
        WEB_SEARCH => format_search_result(output),
        WEB_FETCH => format_fetch_result(output),
        _ => vec![StyledLine::normal(output.to_llm_string())],
    }
}

fn format_bash_result(output: &ToolOutput) -> Vec<StyledLine> {
    let exit_code = output.get("exit_code").and_then(Value::as_i64).unwrap_or(-1);
    let status = if exit_code == 0 {
        "(success)".to_string()
    } else {
        format!("(exit {})", exit_code)
    };

    let mut lines = vec![StyledLine::normal(status)];
    let stdout = output.get_str("stdout").unwrap_or("").trim();
    let stderr = output.get_str("stderr").unwrap_or("").trim();

    if !stdout.is_empty() {
        lines.extend(stdout.split('\n').map(|l| StyledLine::normal(format!("  └ {}", l))));
    }
    if !stderr.is_empty() {
        lines.extend(
            stderr
                .split('\n')
                .map(|l| StyledLine::new(LineStyle::Error, format!("  └ {}", l))),
        );
    }
    if stdout.is_empty() && stderr.is_empty() {
        lines.push(StyledLine::new(LineStyle::Dim, "  └ (no output)"));
    }
    lines
}

fn format_search_result(output: &ToolOutput) -> Vec<StyledLine> {
    let results = output
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut lines = vec![StyledLine::normal(format!("Found {} results:", results.len()))];
    for (i, result) in results.iter().take(10).enumerate() {
        let title: String = result["title"].as_str().unwrap_or("?").chars().take(SEARCH_TITLE_CHARS).collect();
        let url = result["url"].as_str().unwrap_or("?");
        lines.push(StyledLine::normal(format!("  {}. {}", i + 1, title)));
        lines.push(StyledLine::new(LineStyle::Dim, format!("     {}", url)));
    }
    lines
}

fn format_fetch_result(output: &ToolOutput) -> Vec<StyledLine> {
    let title = output.get_str("title").unwrap_or("?");
    let content = output.get_str("content").unwrap_or("");
    let preview = truncate_chars(content, FETCH_PREVIEW_CHARS).replace('\n', " ");

    vec![
        StyledLine::normal(format!("Fetched: {}", title)),
        StyledLine::normal(format!(
            "  Content: {} chars",
            format_thousands(content.chars().count() as u64)
        )),
        StyledLine::new(LineStyle::Dim, format!("  Preview: {}", preview)),
    ]
}
