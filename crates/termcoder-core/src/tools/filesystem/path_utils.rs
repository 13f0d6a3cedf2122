//! Path resolution helpers shared by the file tools and the permission gate

use std::path::{Component, Path, PathBuf};

use crate::error::ToolError;

/// Convert a path to a display string with forward slash separators
pub fn path_to_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Expand `~`, anchor relative paths at `workspace` and drop `.`/`..`
///
/// No containment check is made: absolute paths and `..` may leave the
/// workspace.
pub fn resolve_path(raw: &str, workspace: &Path) -> PathBuf {
    let expanded = expand_home(raw);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        workspace.join(expanded)
    };
    normalize_path(&absolute)
}

fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

/// Normalize a path by resolving `.` and `..` components without touching
/// the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => components.push(Component::Prefix(p)),
            Component::RootDir => {
                components.retain(|c| matches!(c, Component::Prefix(_)));
                components.push(Component::RootDir);
            }
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::Normal(_) | Component::CurDir) => {
                    components.pop();
                }
                Some(Component::ParentDir) | None => components.push(Component::ParentDir),
            },
            Component::Normal(c) => components.push(Component::Normal(c)),
        }
    }

    if components.is_empty() {
        PathBuf::from(".")
    } else {
        components.iter().collect()
    }
}

/// Write `content` to `path` through a sibling temp file and a rename
///
/// Parent directories are created as needed. Readers either see the old
/// file or the complete new one.
pub async fn write_atomic(path: &Path, content: &str) -> Result<(), ToolError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| ToolError::InvalidParams(format!("Invalid file path: {}", path_to_display(path))))?;
    tokio::fs::create_dir_all(parent).await?;

    let file_name = path
        .file_name()
        .ok_or_else(|| ToolError::InvalidParams(format!("Invalid file path: {}", path_to_display(path))))?;
    let temp_path = parent.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    ));

    if let Err(e) = tokio::fs::write(&temp_path, content).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_join_workspace() {
        assert_eq!(
            resolve_path("src/../lib.rs", Path::new("/work")),
            PathBuf::from("/work/lib.rs")
        );
        assert_eq!(resolve_path(".", Path::new("/work")), PathBuf::from("/work"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        assert_eq!(
            resolve_path("/etc/hosts", Path::new("/work")),
            PathBuf::from("/etc/hosts")
        );
    }

    #[test]
    fn test_home_expansion() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolve_path("~/notes.txt", Path::new("/work")), home.join("notes.txt"));
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
    }

    #[tokio::test]
    async fn test_write_atomic_creates_parents() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("nested/deeper/file.txt");

        write_atomic(&target, "hello").await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
        let leftovers: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
