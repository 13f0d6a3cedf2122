//! Filesystem tools for file operations

mod edit;
mod list;
pub mod path_utils;
mod read;
mod write;

pub use edit::EditFile;
pub use list::ListFiles;
pub use read::ReadFile;
pub use write::WriteFile;

pub use path_utils::{normalize_path, path_to_display, resolve_path, write_atomic};

use crate::error::ToolError;

/// Map a read failure to the tool error the model should see
///
/// A missing file is reported distinctly from other I/O failures.
pub(crate) fn read_error(err: std::io::Error, requested: &str) -> ToolError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ToolError::FileNotFound(requested.to_string())
    } else {
        ToolError::Io(err)
    }
}
