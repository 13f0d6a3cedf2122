//! List directory tool

use serde_json::{Value, json};
use std::path::PathBuf;

use crate::error::ToolError;
use crate::tools::{BoxFuture, LIST_FILES, Tool, ToolOutput};

use super::{path_to_display, resolve_path};

/// Tool for listing the entries of one directory
pub struct ListFiles {
    workspace: PathBuf,
}

impl ListFiles {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

impl Tool for ListFiles {
    fn name(&self) -> &str {
        LIST_FILES
    }

    fn description(&self) -> &str {
        "List files and directories at a path. Returns each entry's name and type."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to list (default: current directory)",
                    "default": "."
                }
            }
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let requested = params["path"].as_str().unwrap_or(".");
            let path = resolve_path(requested, &self.workspace);

            let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ToolError::FileNotFound(requested.to_string())
                } else {
                    ToolError::Io(e)
                }
            })?;
            if !metadata.is_dir() {
                return Err(ToolError::NotADirectory(requested.to_string()));
            }

            let mut entries = Vec::new();
            let mut dir = tokio::fs::read_dir(&path).await?;
            while let Some(entry) = dir.next_entry().await? {
                let name = entry.file_name().to_string_lossy().to_string();
                // Follow symlinks; a dangling link falls back to its own type
                let is_dir = match tokio::fs::metadata(entry.path()).await {
                    Ok(metadata) => metadata.is_dir(),
                    Err(_) => entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false),
                };
                entries.push((name, is_dir));
            }
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let items: Vec<Value> = entries
                .into_iter()
                .map(|(name, is_dir)| {
                    json!({
                        "name": name,
                        "type": if is_dir { "directory" } else { "file" }
                    })
                })
                .collect();

            Ok(ToolOutput::success(json!({
                "path": path_to_display(&path),
                "items": items
            })))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_sorted_with_types() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::create_dir(dir.path().join("a_dir")).unwrap();
        std::fs::write(dir.path().join(".hidden"), "").unwrap();

        let tool = ListFiles::new(dir.path().to_path_buf());
        let output = tool.execute(json!({})).await.unwrap();

        assert_eq!(
            output.get("items").unwrap(),
            &json!([
                {"name": ".hidden", "type": "file"},
                {"name": "a_dir", "type": "directory"},
                {"name": "b.txt", "type": "file"}
            ])
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_report_their_target_type() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "n").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("notes.txt"), dir.path().join("notes_link")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling")).unwrap();

        let tool = ListFiles::new(dir.path().to_path_buf());
        let output = tool.execute(json!({})).await.unwrap();

        assert_eq!(
            output.get("items").unwrap(),
            &json!([
                {"name": "dangling", "type": "file"},
                {"name": "link", "type": "directory"},
                {"name": "notes.txt", "type": "file"},
                {"name": "notes_link", "type": "file"},
                {"name": "real", "type": "directory"}
            ])
        );
    }

    #[tokio::test]
    async fn test_file_is_not_a_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("plain.txt"), "x").unwrap();

        let tool = ListFiles::new(dir.path().to_path_buf());
        let err = tool.execute(json!({"path": "plain.txt"})).await.unwrap_err();
        assert_eq!(err.to_string(), "Not a directory: plain.txt");

        let err = tool.execute(json!({"path": "missing"})).await.unwrap_err();
        assert_eq!(err.to_string(), "File not found: missing");
    }
}
