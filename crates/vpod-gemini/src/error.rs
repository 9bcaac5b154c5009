//! Gemini client error types.

use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY not set")]
    MissingApiKey,

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("State query failed: {0}")]
    StateQueryFailed(String),

    #[error("Remote file failed: {0}")]
    RemoteFileFailed(String),

    #[error("Remote processing timed out after {0} seconds")]
    ProcessingTimeout(u64),

    #[error("Generation failed: {0}")]
    GenerateFailed(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeminiError {
    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    pub fn state_query_failed(msg: impl Into<String>) -> Self {
        Self::StateQueryFailed(msg.into())
    }

    pub fn remote_file_failed(msg: impl Into<String>) -> Self {
        Self::RemoteFileFailed(msg.into())
    }

    pub fn generate_failed(msg: impl Into<String>) -> Self {
        Self::GenerateFailed(msg.into())
    }
}
