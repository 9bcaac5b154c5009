//! Audio normalization.
//!
//! Converts an acquired container to a compact speech-bitrate mp3 before
//! upload. Conversion is a best-effort size optimization, not a correctness
//! requirement: the remote service can usually consume raw containers too,
//! so any failure degrades to passing the original file through unchanged.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::acquire::AcquiredMedia;
use crate::error::{MediaError, MediaResult};

/// Audio containers accepted as-is, no conversion needed.
pub const ACCEPTED_AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "m4a", "wav"];

/// Speech-adequate bitrate; the remote service only needs intelligible
/// speech, not fidelity.
const AUDIO_BITRATE: &str = "64k";

/// A normalized artifact ready for upload.
#[derive(Debug, Clone)]
pub struct NormalizedAudio {
    /// Location inside the request workspace
    pub path: PathBuf,
    /// MIME type to declare on upload
    pub mime_type: String,
}

/// Normalize acquired media into a compact audio artifact.
///
/// Already-audio input short-circuits, which also makes the operation
/// idempotent. On successful conversion the original container is deleted;
/// ownership transfers fully to the new artifact. Conversion failures are
/// logged and the original is returned unchanged.
pub async fn normalize_audio(media: AcquiredMedia) -> NormalizedAudio {
    let ext = extension_of(&media.path);

    if ACCEPTED_AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        debug!(file = media.original_name.as_str(), "Already an accepted audio container");
        return NormalizedAudio {
            mime_type: mime_for_extension(&ext).to_string(),
            path: media.path,
        };
    }

    let output_path = media.path.with_extension("mp3");
    match convert_to_audio(&media.path, &output_path).await {
        Ok(()) => {
            if let Err(e) = tokio::fs::remove_file(&media.path).await {
                warn!(
                    path = %media.path.display(),
                    error = %e,
                    "Failed to remove original after conversion (non-fatal)"
                );
            }
            info!(
                output = %output_path.display(),
                bitrate = AUDIO_BITRATE,
                "Converted source to compact audio"
            );
            NormalizedAudio {
                path: output_path,
                mime_type: "audio/mp3".to_string(),
            }
        }
        Err(e) => {
            warn!(
                file = media.original_name.as_str(),
                error = %e,
                "Audio conversion failed, passing original to the remote service"
            );
            tokio::fs::remove_file(&output_path).await.ok();
            NormalizedAudio {
                mime_type: mime_for_extension(&ext).to_string(),
                path: media.path,
            }
        }
    }
}

/// MIME type for an upload, by file extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "mp3" => "audio/mp3",
        "m4a" => "audio/m4a",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Resolve the FFmpeg binary, overridable like the extractor.
fn ffmpeg_bin() -> String {
    std::env::var("VPOD_FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string())
}

/// Decode the container's audio track and re-encode at the speech bitrate.
async fn convert_to_audio(input: &Path, output: &Path) -> MediaResult<()> {
    let bin = ffmpeg_bin();
    which::which(&bin).map_err(|_| MediaError::FfmpegNotFound)?;

    debug!(
        input = %input.display(),
        output = %output.display(),
        "Running FFmpeg audio extraction"
    );

    let input_str = input.to_string_lossy().to_string();
    let output_str = output.to_string_lossy().to_string();

    let result = Command::new(&bin)
        .args([
            "-y",
            "-i",
            input_str.as_str(),
            "-vn",
            "-b:a",
            AUDIO_BITRATE,
            output_str.as_str(),
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(MediaError::ffmpeg_failed(
            stderr.lines().last().unwrap_or("unknown error").to_string(),
        ));
    }

    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn acquired(path: PathBuf, size: u64) -> AcquiredMedia {
        AcquiredMedia {
            original_name: path.file_name().unwrap().to_string_lossy().to_string(),
            path,
            size_bytes: size,
        }
    }

    #[tokio::test]
    async fn test_accepted_audio_short_circuits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episode.mp3");
        tokio::fs::write(&path, b"mp3 bytes").await.unwrap();

        let audio = normalize_audio(acquired(path.clone(), 9)).await;

        assert_eq!(audio.path, path);
        assert_eq!(audio.mime_type, "audio/mp3");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_normalize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episode.wav");
        tokio::fs::write(&path, b"wav bytes").await.unwrap();

        let first = normalize_audio(acquired(path.clone(), 9)).await;
        let second = normalize_audio(acquired(first.path.clone(), 9)).await;

        assert_eq!(first.path, second.path);
        assert_eq!(first.mime_type, second.mime_type);
    }

    #[tokio::test]
    async fn test_conversion_failure_returns_original_unchanged() {
        // Not a real container: FFmpeg (when present) fails on it, and when
        // absent the missing-binary path degrades the same way.
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("episode.mp4");
        tokio::fs::write(&path, b"not a real mp4").await.unwrap();

        let audio = normalize_audio(acquired(path.clone(), 14)).await;

        assert_eq!(audio.path, path);
        assert_eq!(audio.mime_type, "video/mp4");
        assert!(path.exists(), "original must survive a failed conversion");
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("mp3"), "audio/mp3");
        assert_eq!(mime_for_extension("M4A"), "audio/m4a");
        assert_eq!(mime_for_extension("wav"), "audio/wav");
        assert_eq!(mime_for_extension("mp4"), "video/mp4");
        assert_eq!(mime_for_extension("mov"), "video/quicktime");
        assert_eq!(mime_for_extension("xyz"), "application/octet-stream");
    }
}
