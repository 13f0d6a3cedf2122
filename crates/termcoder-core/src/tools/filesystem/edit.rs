//! Edit file tool - unique exact-match replacement

use serde_json::{Value, json};
use std::path::PathBuf;

use crate::error::ToolError;
use crate::tools::{BoxFuture, EDIT_FILE, Tool, ToolOutput, required_str};

use super::{path_to_display, read_error, resolve_path, write_atomic};

/// Tool for replacing one exact occurrence of a string in a file
pub struct EditFile {
    workspace: PathBuf,
}

impl EditFile {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

/// Replace the single occurrence of `old_text`, or explain why not
pub fn replace_unique(content: &str, old_text: &str, new_text: &str) -> Result<String, ToolError> {
    if old_text.is_empty() {
        return Err(ToolError::Validation("old_text must not be empty".into()));
    }

    match content.matches(old_text).count() {
        0 => Err(ToolError::Validation("old_text not found in file".into())),
        1 => Ok(content.replacen(old_text, new_text, 1)),
        n => Err(ToolError::Validation(format!(
            "old_text appears {} times in file - include more surrounding context to make it unique",
            n
        ))),
    }
}

impl Tool for EditFile {
    fn name(&self) -> &str {
        EDIT_FILE
    }

    fn description(&self) -> &str {
        "Replace an exact piece of text in an existing file. old_text must appear exactly once; \
         include surrounding lines when it is not unique. Read the file first so whitespace matches."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file to edit"
                },
                "old_text": {
                    "type": "string",
                    "description": "Exact text to replace (must be unique in the file)"
                },
                "new_text": {
                    "type": "string",
                    "description": "Replacement text"
                }
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let requested = required_str(&params, "path")?;
            let old_text = required_str(&params, "old_text")?;
            let new_text = required_str(&params, "new_text")?;
            let path = resolve_path(requested, &self.workspace);

            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| read_error(e, requested))?;

            let updated = replace_unique(&content, old_text, new_text)?;
            write_atomic(&path, &updated).await?;
            tracing::debug!(path = %path.display(), "Edited file");

            Ok(ToolOutput::success(json!({
                "path": path_to_display(&path),
                "action": "edited"
            })))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_match_is_replaced() {
        assert_eq!(
            replace_unique("let x = 1;\nlet y = 2;\n", "y = 2", "y = 3").unwrap(),
            "let x = 1;\nlet y = 3;\n"
        );
    }

    #[test]
    fn test_missing_and_ambiguous_matches() {
        let err = replace_unique("abc", "zzz", "y").unwrap_err();
        assert_eq!(err.to_string(), "old_text not found in file");

        let err = replace_unique("a a a", "a", "b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "old_text appears 3 times in file - include more surrounding context to make it unique"
        );
    }

    #[test]
    fn test_empty_old_text_is_rejected() {
        assert!(matches!(replace_unique("abc", "", "x"), Err(ToolError::Validation(_))));
    }
}
