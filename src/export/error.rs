// ABOUTME: Error types for rendering workflows into .dig text
// ABOUTME: Covers task configurations that cannot be expressed in the output format

use thiserror::Error;

use crate::model::IterableError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error("Command task '{task}' has no command to run")]
    MissingCommand { task: String },

    #[error("Task '{task}' builds an image but no image is attached")]
    MissingImage { task: String },

    #[error("Invalid repeat task '{task}': {source}")]
    InvalidIterables {
        task: String,
        #[source]
        source: IterableError,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;
