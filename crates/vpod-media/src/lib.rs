//! Media intake for ViralPod.
//!
//! This crate provides:
//! - Pure source classification (platform link, drive share, direct URL, upload)
//! - Acquisition with streamed chunked transfers and an extractor fallback
//! - Best-effort audio normalization via the FFmpeg CLI
//! - Isolated per-request workspace directories

pub mod acquire;
pub mod error;
pub mod normalize;
pub mod source;
pub mod workspace;

pub use acquire::{acquire, persist_upload, AcquiredMedia};
pub use error::{MediaError, MediaResult};
pub use normalize::{
    mime_for_extension, normalize_audio, NormalizedAudio, ACCEPTED_AUDIO_EXTENSIONS,
};
pub use source::{resolve, resolve_upload, sanitize_file_name, SourceDescriptor};
pub use workspace::RequestWorkspace;
