// ABOUTME: Error types for workflow model construction and project file loading
// ABOUTME: Defines specific error types for model module operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read project file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Duplicate workflow name: {0}")]
    DuplicateWorkflow(String),

    #[error("Invalid repeat task '{task}': {source}")]
    InvalidIterables {
        task: String,
        #[source]
        source: IterableError,
    },
}

/// Problems with the `for_each>` values of a repeat task.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IterableError {
    #[error("no iterables defined")]
    Empty,

    #[error("iterable '{key}' has no values")]
    EmptyValues { key: String },

    #[error("iterable '{key}' mixes strings and integers")]
    MixedTypes { key: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
