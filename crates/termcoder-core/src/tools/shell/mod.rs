//! Shell tool for command execution
//!
//! Output shaping keeps long command output from flooding the conversation:
//! stdout is cut to [`STDOUT_MAX_LINES`] lines and stderr to
//! [`STDERR_MAX_LINES`] unless the model asks for `all`.

mod execute;

pub use execute::RunBash;

use std::str::FromStr;

pub const STDOUT_MAX_LINES: usize = 50;
pub const STDERR_MAX_LINES: usize = 20;

pub const DEFAULT_TIMEOUT_SECS: i64 = 30;
pub const MIN_TIMEOUT_SECS: i64 = 1;
pub const MAX_TIMEOUT_SECS: i64 = 600;

/// Which part of long output to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    First,
    Last,
    #[default]
    Both,
    All,
}

impl OutputMode {
    /// Parse a mode name; anything unrecognised falls back to `Both`
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(OutputMode::First),
            "last" => Ok(OutputMode::Last),
            "both" => Ok(OutputMode::Both),
            "all" => Ok(OutputMode::All),
            _ => Err(format!("Unknown output mode: {}", s)),
        }
    }
}

/// Clamp a requested timeout into `[1, 600]` seconds
pub fn clamp_timeout(requested: i64) -> u64 {
    requested.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS) as u64
}

/// Cut `text` down to `max_lines` lines according to `mode`
///
/// A single trailing newline does not count as a line. Text that already
/// fits is returned unchanged.
pub fn truncate_output(text: &str, max_lines: usize, mode: OutputMode) -> String {
    if mode == OutputMode::All {
        return text.to_string();
    }

    let body = text.strip_suffix('\n').unwrap_or(text);
    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() <= max_lines {
        return text.to_string();
    }

    match mode {
        OutputMode::First => {
            let omitted = lines.len() - max_lines;
            format!("{}\n... ({} more lines)", lines[..max_lines].join("\n"), omitted)
        }
        OutputMode::Last => {
            let omitted = lines.len() - max_lines;
            format!(
                "... ({} lines omitted)\n{}",
                omitted,
                lines[lines.len() - max_lines..].join("\n")
            )
        }
        OutputMode::Both | OutputMode::All => {
            let half = max_lines / 2;
            let omitted = lines.len() - 2 * half;
            format!(
                "{}\n... ({} lines omitted) ...\n{}",
                lines[..half].join("\n"),
                omitted,
                lines[lines.len() - half..].join("\n")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> String {
        (1..=count).map(|i| format!("{}\n", i)).collect()
    }

    #[test]
    fn test_clamp_timeout() {
        assert_eq!(clamp_timeout(5000), 600);
        assert_eq!(clamp_timeout(-1), 1);
        assert_eq!(clamp_timeout(0), 1);
        assert_eq!(clamp_timeout(45), 45);
    }

    #[test]
    fn test_unknown_mode_defaults_to_both() {
        assert_eq!(OutputMode::parse_or_default(Some("middle")), OutputMode::Both);
        assert_eq!(OutputMode::parse_or_default(None), OutputMode::Both);
        assert_eq!(OutputMode::parse_or_default(Some("last")), OutputMode::Last);
    }

    #[test]
    fn test_short_output_is_untouched() {
        let text = numbered(50);
        assert_eq!(truncate_output(&text, 50, OutputMode::Both), text);
        assert_eq!(truncate_output("", 50, OutputMode::First), "");
    }

    #[test]
    fn test_first_keeps_head() {
        let out = truncate_output(&numbered(60), 50, OutputMode::First);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 51);
        assert_eq!(lines[0], "1");
        assert_eq!(lines[49], "50");
        assert_eq!(lines[50], "... (10 more lines)");
    }

    #[test]
    fn test_last_keeps_tail() {
        let out = truncate_output(&numbered(30), 20, OutputMode::Last);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "... (10 lines omitted)");
        assert_eq!(lines[1], "11");
        assert_eq!(lines[20], "30");
    }

    #[test]
    fn test_both_splits_head_and_tail() {
        let out = truncate_output(&numbered(1000), 50, OutputMode::Both);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 51);
        assert_eq!(lines[24], "25");
        assert_eq!(lines[25], "... (950 lines omitted) ...");
        assert_eq!(lines[26], "976");
        assert_eq!(lines[50], "1000");
    }

    #[test]
    fn test_all_is_verbatim() {
        let text = numbered(1000);
        assert_eq!(truncate_output(&text, 50, OutputMode::All), text);
    }
}
