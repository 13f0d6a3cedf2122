//! Run shell command tool

use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::ToolError;
use crate::tools::{BoxFuture, RUN_BASH, Tool, ToolOutput, required_str};

use super::{
    DEFAULT_TIMEOUT_SECS, OutputMode, STDERR_MAX_LINES, STDOUT_MAX_LINES, clamp_timeout,
    truncate_output,
};

/// Tool for running a command through `sh -c`
pub struct RunBash {
    workspace: PathBuf,
}

impl RunBash {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for RunBash {
    fn name(&self) -> &str {
        RUN_BASH
    }

    fn description(&self) -> &str {
        "Run a shell command in the working directory and return its exit code, stdout and stderr. \
         Long output is truncated; use output_lines to choose which part to keep."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to run"
                },
                "timeout": {
                    "type": "integer",
                    "description": "Timeout in seconds, 1-600 (default: 30)",
                    "default": DEFAULT_TIMEOUT_SECS
                },
                "output_lines": {
                    "type": "string",
                    "enum": ["first", "last", "both", "all"],
                    "description": "Which lines to keep from long output: first, last, both (head and tail) or all",
                    "default": "both"
                }
            },
            "required": ["command"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let command = required_str(&params, "command")?;
            let requested = params["timeout"]
                .as_i64()
                .or_else(|| params["timeout"].as_f64().map(|t| t as i64))
                .unwrap_or(DEFAULT_TIMEOUT_SECS);
            let timeout = clamp_timeout(requested);
            let mode = OutputMode::parse_or_default(params["output_lines"].as_str());

            tracing::debug!(command, timeout, ?mode, "Running shell command");

            let child = Command::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(&self.workspace)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output();

            let output = tokio::time::timeout(Duration::from_secs(timeout), child)
                .await
                .map_err(|_| ToolError::Timeout(timeout))??;

            let exit_code = output.status.code().unwrap_or(-1);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);

            Ok(ToolOutput::success(json!({
                "exit_code": exit_code,
                "stdout": truncate_output(&stdout, STDOUT_MAX_LINES, mode),
                "stderr": truncate_output(&stderr, STDERR_MAX_LINES, mode)
            }))
            .with_success(exit_code == 0))
        })
    }
}
