//! Permission gate for side-effecting tools
//!
//! The gate is a pure decision function over (tool name, arguments, mode).
//! When a decision needs a human, it returns a [`ConfirmationRequest`] and the
//! caller performs the blocking step through a [`Confirmer`]. This keeps the
//! policy testable without simulating terminal input.

pub mod dangerous;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::formatting::{to_relative_display, truncate_chars};
use crate::tools::filesystem::path_utils::resolve_path;
use crate::tools::{EDIT_FILE, LIST_FILES, READ_FILE, RUN_BASH, WEB_FETCH, WEB_SEARCH, WRITE_FILE};

pub use dangerous::{DANGEROUS_PATTERNS, DangerCheck, DangerousCommandInterceptor, DangerousPattern};

/// Characters of old/new text shown in an edit prompt
const EDIT_PREVIEW_CHARS: usize = 50;

/// Tools that never prompt, in any mode
pub const READ_ONLY_TOOLS: &[&str] = &[READ_FILE, LIST_FILES, WEB_SEARCH, WEB_FETCH];

pub fn is_read_only(tool_name: &str) -> bool {
    READ_ONLY_TOOLS.iter().any(|name| *name == tool_name)
}

/// Policy level for write/edit/shell actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionMode {
    /// Prompt before any write, edit or shell command
    #[default]
    Default,
    /// File writes and edits are pre-approved, shell still prompts
    AcceptEdits,
    /// Everything is pre-approved
    Yolo,
}

impl PermissionMode {
    /// Next mode in the `default -> accept-edits -> yolo -> default` cycle
    pub fn next(self) -> Self {
        match self {
            PermissionMode::Default => PermissionMode::AcceptEdits,
            PermissionMode::AcceptEdits => PermissionMode::Yolo,
            PermissionMode::Yolo => PermissionMode::Default,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PermissionMode::Default => "Ask before writing files, editing files or running commands",
            PermissionMode::AcceptEdits => "File writes and edits are auto-approved, commands still ask",
            PermissionMode::Yolo => "Everything is auto-approved (dangerous commands are still blocked)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionMode::Default => "default",
            PermissionMode::AcceptEdits => "accept-edits",
            PermissionMode::Yolo => "yolo",
        }
    }
}

impl std::fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(PermissionMode::Default),
            "accept-edits" | "accept_edits" => Ok(PermissionMode::AcceptEdits),
            "yolo" => Ok(PermissionMode::Yolo),
            _ => Err(format!(
                "Unknown permission mode: {}. Valid values: default, accept-edits, yolo",
                s
            )),
        }
    }
}

/// What the user is asked before a side-effecting action runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub tool_name: String,
    /// One-line label, e.g. "Write file"
    pub action: String,
    /// Path summary, edit preview or literal command
    pub details: String,
    /// Reason reported to the model if the user says no
    pub decline_reason: String,
}

/// Outcome of the pure policy check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    Allow,
    Confirm(ConfirmationRequest),
}

/// Final gate outcome after any confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied { reason: String },
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

/// Capability to ask the user a yes/no question
///
/// Implementations block until an answer arrives. Interruption and end of
/// input must be reported as `false`.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, request: &ConfirmationRequest) -> bool;
}

/// Confirmer that approves everything without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

#[async_trait]
impl Confirmer for AutoApprove {
    async fn confirm(&self, _request: &ConfirmationRequest) -> bool {
        true
    }
}

/// Confirmer that declines everything without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecline;

#[async_trait]
impl Confirmer for AutoDecline {
    async fn confirm(&self, _request: &ConfirmationRequest) -> bool {
        false
    }
}

/// Decides whether a tool call may execute
#[derive(Debug, Clone)]
pub struct PermissionGate {
    workspace: PathBuf,
}

impl PermissionGate {
    /// `workspace` is used to render paths in prompts relative to it
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Pure policy decision, no I/O
    ///
    /// Tool names the gate does not recognise are allowed. Extension tools
    /// are assumed to be read-like; register anything side-effecting here.
    pub fn decide(&self, tool_name: &str, args: &Value, mode: PermissionMode) -> PermissionDecision {
        if is_read_only(tool_name) || mode == PermissionMode::Yolo {
            return PermissionDecision::Allow;
        }

        match tool_name {
            WRITE_FILE | EDIT_FILE if mode == PermissionMode::AcceptEdits => PermissionDecision::Allow,
            WRITE_FILE => PermissionDecision::Confirm(self.write_request(args)),
            EDIT_FILE => PermissionDecision::Confirm(self.edit_request(args)),
            RUN_BASH => PermissionDecision::Confirm(shell_request(args)),
            _ => PermissionDecision::Allow,
        }
    }

    /// Run the policy and, when required, ask through `confirmer`
    pub async fn authorize(
        &self,
        tool_name: &str,
        args: &Value,
        mode: PermissionMode,
        confirmer: &dyn Confirmer,
    ) -> Verdict {
        match self.decide(tool_name, args, mode) {
            PermissionDecision::Allow => Verdict::Allowed,
            PermissionDecision::Confirm(request) => {
                if confirmer.confirm(&request).await {
                    tracing::debug!(tool = tool_name, "User approved");
                    Verdict::Allowed
                } else {
                    tracing::info!(tool = tool_name, "User declined");
                    Verdict::Denied {
                        reason: request.decline_reason,
                    }
                }
            }
        }
    }

    fn display_path(&self, args: &Value) -> String {
        let raw = args.get("path").and_then(Value::as_str).unwrap_or("");
        let resolved = resolve_path(raw, &self.workspace);
        to_relative_display(&resolved, &self.workspace)
    }

    fn write_request(&self, args: &Value) -> ConfirmationRequest {
        let content = args.get("content").and_then(Value::as_str).unwrap_or("");
        let lines = if content.is_empty() {
            0
        } else {
            content.matches('\n').count() + 1
        };

        ConfirmationRequest {
            tool_name: WRITE_FILE.to_string(),
            action: "Write file".to_string(),
            details: format!("{} ({} lines)", self.display_path(args), lines),
            decline_reason: "User declined to write file".to_string(),
        }
    }

    fn edit_request(&self, args: &Value) -> ConfirmationRequest {
        let preview = |key: &str| {
            let text = args.get(key).and_then(Value::as_str).unwrap_or("");
            truncate_chars(text, EDIT_PREVIEW_CHARS)
        };

        ConfirmationRequest {
            tool_name: EDIT_FILE.to_string(),
            action: "Edit file".to_string(),
            details: format!(
                "{}\n  - {:?}\n  + {:?}",
                self.display_path(args),
                preview("old_text"),
                preview("new_text")
            ),
            decline_reason: "User declined to edit file".to_string(),
        }
    }
}

fn shell_request(args: &Value) -> ConfirmationRequest {
    let command = args.get("command").and_then(Value::as_str).unwrap_or("");
    ConfirmationRequest {
        tool_name: RUN_BASH.to_string(),
        action: "Run command".to_string(),
        details: command.to_string(),
        decline_reason: "User declined to run command".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL_MODES: [PermissionMode; 3] = [
        PermissionMode::Default,
        PermissionMode::AcceptEdits,
        PermissionMode::Yolo,
    ];

    fn gate() -> PermissionGate {
        PermissionGate::new("/work")
    }

    fn prompts(tool: &str, args: Value, mode: PermissionMode) -> bool {
        matches!(gate().decide(tool, &args, mode), PermissionDecision::Confirm(_))
    }

    #[test]
    fn test_mode_cycle() {
        assert_eq!(PermissionMode::Default.next(), PermissionMode::AcceptEdits);
        assert_eq!(PermissionMode::AcceptEdits.next(), PermissionMode::Yolo);
        assert_eq!(PermissionMode::Yolo.next(), PermissionMode::Default);
    }

    #[test]
    fn test_mode_parse_and_display() {
        for mode in ALL_MODES {
            assert_eq!(mode.to_string().parse::<PermissionMode>().unwrap(), mode);
        }
        assert_eq!("YOLO".parse::<PermissionMode>().unwrap(), PermissionMode::Yolo);
        assert!("sometimes".parse::<PermissionMode>().is_err());
    }

    #[test]
    fn test_read_only_tools_never_prompt() {
        for mode in ALL_MODES {
            for tool in READ_ONLY_TOOLS {
                assert!(!prompts(tool, json!({}), mode), "{} prompted in {}", tool, mode);
            }
        }
    }

    #[test]
    fn test_edits_prompt_only_in_default_mode() {
        let args = json!({"path": "a.txt", "content": "x"});
        assert!(prompts(WRITE_FILE, args.clone(), PermissionMode::Default));
        assert!(!prompts(WRITE_FILE, args.clone(), PermissionMode::AcceptEdits));
        assert!(!prompts(WRITE_FILE, args, PermissionMode::Yolo));

        let args = json!({"path": "a.txt", "old_text": "a", "new_text": "b"});
        assert!(prompts(EDIT_FILE, args.clone(), PermissionMode::Default));
        assert!(!prompts(EDIT_FILE, args.clone(), PermissionMode::AcceptEdits));
        assert!(!prompts(EDIT_FILE, args, PermissionMode::Yolo));
    }

    #[test]
    fn test_shell_prompts_unless_yolo() {
        let args = json!({"command": "ls"});
        assert!(prompts(RUN_BASH, args.clone(), PermissionMode::Default));
        assert!(prompts(RUN_BASH, args.clone(), PermissionMode::AcceptEdits));
        assert!(!prompts(RUN_BASH, args, PermissionMode::Yolo));
    }

    #[test]
    fn test_unknown_tool_is_allowed() {
        for mode in ALL_MODES {
            assert_eq!(
                gate().decide("some_extension_tool", &json!({}), mode),
                PermissionDecision::Allow
            );
        }
    }

    #[test]
    fn test_write_summary() {
        let decision = gate().decide(
            WRITE_FILE,
            &json!({"path": "src/main.rs", "content": "a\nb\nc"}),
            PermissionMode::Default,
        );
        let PermissionDecision::Confirm(request) = decision else {
            panic!("expected confirmation");
        };
        assert_eq!(request.action, "Write file");
        assert_eq!(request.details, "./src/main.rs (3 lines)");
        assert_eq!(request.decline_reason, "User declined to write file");
    }

    #[test]
    fn test_edit_summary_truncates_preview() {
        let long = "x".repeat(80);
        let decision = gate().decide(
            EDIT_FILE,
            &json!({"path": "a.txt", "old_text": long, "new_text": "y"}),
            PermissionMode::Default,
        );
        let PermissionDecision::Confirm(request) = decision else {
            panic!("expected confirmation");
        };
        let expected_old = format!("{}...", "x".repeat(50));
        assert_eq!(
            request.details,
            format!("./a.txt\n  - {:?}\n  + {:?}", expected_old, "y")
        );
    }

    #[test]
    fn test_shell_summary_is_literal_command() {
        let decision = gate().decide(RUN_BASH, &json!({"command": "cargo test -q"}), PermissionMode::AcceptEdits);
        let PermissionDecision::Confirm(request) = decision else {
            panic!("expected confirmation");
        };
        assert_eq!(request.action, "Run command");
        assert_eq!(request.details, "cargo test -q");
    }

    #[tokio::test]
    async fn test_authorize_decline_carries_reason() {
        let verdict = gate()
            .authorize(RUN_BASH, &json!({"command": "ls"}), PermissionMode::Default, &AutoDecline)
            .await;
        assert_eq!(
            verdict,
            Verdict::Denied {
                reason: "User declined to run command".to_string()
            }
        );

        let verdict = gate()
            .authorize(RUN_BASH, &json!({"command": "ls"}), PermissionMode::Default, &AutoApprove)
            .await;
        assert!(verdict.is_allowed());
    }
}
