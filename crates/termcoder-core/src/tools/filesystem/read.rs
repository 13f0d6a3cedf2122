//! Read file tool

use serde_json::{Value, json};
use std::path::PathBuf;

use crate::error::ToolError;
use crate::tools::{BoxFuture, READ_FILE, Tool, ToolOutput, required_str};

use super::{path_to_display, read_error, resolve_path};

/// Tool for reading file contents
pub struct ReadFile {
    workspace: PathBuf,
}

impl ReadFile {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ReadFile {
    fn name(&self) -> &str {
        READ_FILE
    }

    fn description(&self) -> &str {
        "Read the full text content of a file."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "Path to the file to read (relative to the working directory, absolute, or starting with ~)"
                }
            },
            "required": ["filename"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let filename = required_str(&params, "filename")?;
            let path = resolve_path(filename, &self.workspace);

            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| read_error(e, filename))?;

            Ok(ToolOutput::success(json!({
                "file_path": path_to_display(&path),
                "content": content
            })))
        })
    }
}
