//! Write file tool

use serde_json::{Value, json};
use std::path::PathBuf;

use crate::error::ToolError;
use crate::tools::{BoxFuture, Tool, ToolOutput, WRITE_FILE, required_str};

use super::{path_to_display, resolve_path, write_atomic};

/// Tool for creating or overwriting a file
pub struct WriteFile {
    workspace: PathBuf,
}

impl WriteFile {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for WriteFile {
    fn name(&self) -> &str {
        WRITE_FILE
    }

    fn description(&self) -> &str {
        "Create a new file or overwrite an existing one with the given content. \
         Parent directories are created as needed."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "Full content of the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let requested = required_str(&params, "path")?;
            let content = required_str(&params, "content")?;
            let path = resolve_path(requested, &self.workspace);

            write_atomic(&path, content).await?;
            tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote file");

            Ok(ToolOutput::success(json!({
                "path": path_to_display(&path),
                "action": "created"
            })))
        })
    }
}
