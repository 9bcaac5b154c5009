//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during source acquisition and normalization.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("No acquisition strategy matches input: {0}")]
    UnresolvableSource(String),

    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed { message: String },

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Upload exceeds maximum size: {size_bytes} > {max_bytes} bytes")]
    UploadTooLarge { size_bytes: u64, max_bytes: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an unresolvable-source error.
    pub fn unresolvable(message: impl Into<String>) -> Self {
        Self::UnresolvableSource(message.into())
    }

    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(message: impl Into<String>) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
        }
    }
}
