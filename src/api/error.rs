// ABOUTME: Error types for the Digdag REST client
// ABOUTME: Separates non-success responses, failed lookups and transport failures

use thiserror::Error;

use crate::archive::ArchiveError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Digdag API returned an error status code ({status}): {body}")]
    Transport { status: u16, body: String },

    #[error("No {kind} found for {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to archive project: {0}")]
    ArchiveError(#[from] ArchiveError),
}

impl ApiError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        ApiError::NotFound {
            kind,
            key: key.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
