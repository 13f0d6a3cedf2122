//! System prompt generation
//!
//! The prompt is built once per session and sent ahead of the history on
//! every model call. It is never stored in the history, so clearing the
//! conversation keeps it.

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

use crate::tools::ToolDefinition;

/// System prompt builder
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    workspace: PathBuf,
    date: NaiveDate,
    tools: Vec<(String, String)>,
    guidelines: String,
}

impl SystemPrompt {
    /// Prompt for a session working in `workspace`, dated today
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            date: Local::now().date_naive(),
            tools: Vec::new(),
            guidelines: DEFAULT_GUIDELINES.to_string(),
        }
    }

    /// Override the date shown to the model
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// List these tools in the prompt, using the first line of each description
    pub fn with_tools(mut self, tools: &[ToolDefinition]) -> Self {
        self.tools = tools
            .iter()
            .map(|t| {
                let summary = t.description.lines().next().unwrap_or("").to_string();
                (t.name.clone(), summary)
            })
            .collect();
        self
    }

    /// Replace the default guidelines section
    pub fn with_guidelines(mut self, guidelines: impl Into<String>) -> Self {
        self.guidelines = guidelines.into();
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Build the final system prompt
    pub fn build(&self) -> String {
        let project = self
            .workspace
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.workspace.display().to_string());

        let mut prompt = format!(
            "Today's date is {}.\nYou are working in: {}\nProject/folder name: {}\n\n",
            self.date.format("%A, %B %d, %Y"),
            self.workspace.display(),
            project
        );

        prompt.push_str("You are a helpful coding assistant with access to these tools:\n");
        for (name, summary) in &self.tools {
            prompt.push_str(&format!("- {}: {}\n", name, summary));
        }
        prompt.push('\n');
        prompt.push_str(&self.guidelines);
        prompt
    }
}

/// Guidelines appended after the tool list
pub const DEFAULT_GUIDELINES: &str = r#"Use tools when needed. Use web_search to find current information, documentation, or solutions.
Prefer edit_file over write_file when changing existing files, and read a file before editing it.
Be concise in your responses.

SECURITY GUIDELINES - You must follow these strictly:

1. DANGEROUS COMMANDS: Never generate or execute destructive system commands like:
   - rm -rf / or rm -rf ~ (filesystem destruction)
   - mkfs, dd to disk devices (disk wiping)
   - chmod/chown -R on root (permission destruction)
   - fork bombs, shutdown, reboot, halt
   - Deleting /etc/passwd, /etc/shadow, /etc/sudoers
   If a user asks you to run such commands, REFUSE and explain why it's dangerous.
   Commands like these are blocked before they run; when a result says BLOCKED, explain it
   to the user instead of retrying a variation.

2. MALICIOUS CODE: When reading or writing code, be vigilant for:
   - Obfuscated code that hides malicious intent
   - Code that exfiltrates data (sending files/env vars to external servers)
   - Backdoors, reverse shells, or unauthorized network listeners
   If you detect malicious code, WARN the user and refuse to execute or propagate it.

3. CODE YOU WRITE: Keep it free of security vulnerabilities (SQL injection, XSS,
   command injection, etc.) and clear to read.

4. DECLINED ACTIONS: If the user declines a write, edit or command, do not try to reach the
   same result another way. Ask what they would prefer.

OUTPUT FORMATTING:
- When outputting markdown (tables, code blocks, lists), just write the markdown directly.
- Do NOT show both "raw" and "rendered" versions of anything."#;
