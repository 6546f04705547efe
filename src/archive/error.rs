// ABOUTME: Error types for project staging and archive creation
// ABOUTME: Wraps render failures and filesystem errors raised while packaging

use std::path::PathBuf;
use thiserror::Error;

use crate::export::ExportError;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to render workflow '{workflow}': {source}")]
    RenderError {
        workflow: String,
        #[source]
        source: ExportError,
    },

    #[error("Project root is not a directory: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to walk project tree: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Invalid path in project tree: {0}")]
    PathError(#[from] std::path::StripPrefixError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
