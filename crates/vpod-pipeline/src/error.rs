//! Pipeline error taxonomy.
//!
//! Four fatal categories surface one human-readable message at the top
//! level. Conversion failures never appear here (the normalizer degrades
//! silently) and unparseable agent responses are absorbed by the
//! orchestrator as empty partial reports.

use thiserror::Error;

use vpod_gemini::GeminiError;
use vpod_media::MediaError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unresolvable source: {0}")]
    UnresolvableSource(String),

    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("Remote processing failed: {0}")]
    RemoteProcessing(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    pub fn remote_processing(msg: impl Into<String>) -> Self {
        Self::RemoteProcessing(msg.into())
    }
}

impl From<MediaError> for PipelineError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::UnresolvableSource(msg) => Self::UnresolvableSource(msg),
            other => Self::Acquisition(other.to_string()),
        }
    }
}

impl From<GeminiError> for PipelineError {
    fn from(e: GeminiError) -> Self {
        match e {
            GeminiError::Cancelled => Self::Cancelled,
            other => Self::RemoteProcessing(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_error_mapping_keeps_taxonomy() {
        let unresolvable: PipelineError = MediaError::unresolvable("bad input").into();
        assert!(matches!(
            unresolvable,
            PipelineError::UnresolvableSource(_)
        ));

        let download: PipelineError = MediaError::download_failed("404").into();
        assert!(matches!(download, PipelineError::Acquisition(_)));
    }

    #[test]
    fn test_gemini_error_mapping() {
        let timeout: PipelineError = GeminiError::ProcessingTimeout(300).into();
        assert!(matches!(timeout, PipelineError::RemoteProcessing(_)));

        let cancelled: PipelineError = GeminiError::Cancelled.into();
        assert!(matches!(cancelled, PipelineError::Cancelled));
    }
}
