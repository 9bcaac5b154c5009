//! Source classification.
//!
//! Maps a raw user input (URL string or upload handle) onto the acquisition
//! strategy that can fetch it. Classification is pure and side-effect-free;
//! the first matching rule wins.

use crate::error::{MediaError, MediaResult};

/// Recognized video-platform domains, handled by the structured extractor.
const VIDEO_PLATFORM_DOMAINS: [&str; 7] = [
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "twitter.com",
    "x.com",
    "twitch.tv",
    "tiktok.com",
];

/// Cloud-drive domain with file-id share links.
const CLOUD_DRIVE_DOMAIN: &str = "drive.google.com";

/// File-sharing domain with rewritable preview links.
const FILE_SHARING_DOMAIN: &str = "dropbox.com";

/// A classified media source, paired with its acquisition strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    /// Video platform link, acquired via the streaming extractor.
    YouTubeLike { url: String },
    /// Cloud-drive share link with the extracted file id.
    CloudDriveShare { file_id: String },
    /// File-sharing link, rewritten to its direct-download form.
    DropboxShare { url: String },
    /// Any other plain HTTP(S) resource.
    DirectUrl { url: String },
    /// Uploaded byte stream, persisted locally under the sanitized name.
    LocalUpload { file_name: String },
}

/// Classify a user-provided URL.
pub fn resolve(input: &str) -> MediaResult<SourceDescriptor> {
    let input = input.trim();
    if input.is_empty() {
        return Err(MediaError::unresolvable("empty input"));
    }

    if VIDEO_PLATFORM_DOMAINS
        .iter()
        .any(|domain| input.contains(domain))
    {
        return Ok(SourceDescriptor::YouTubeLike {
            url: input.to_string(),
        });
    }

    if input.contains(CLOUD_DRIVE_DOMAIN) {
        return match extract_drive_file_id(input) {
            Some(file_id) => Ok(SourceDescriptor::CloudDriveShare { file_id }),
            None => Err(MediaError::unresolvable(format!(
                "no file id in drive link: {}",
                input
            ))),
        };
    }

    if input.contains(FILE_SHARING_DOMAIN) {
        // Preview links (dl=0) only render an HTML page; the dl=1 form
        // serves the file bytes.
        return Ok(SourceDescriptor::DropboxShare {
            url: input.replace("dl=0", "dl=1"),
        });
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(SourceDescriptor::DirectUrl {
            url: input.to_string(),
        });
    }

    Err(MediaError::unresolvable(input))
}

/// Classify an upload handle. Always succeeds; the destination file name is
/// sanitized here so every later stage sees a path-safe name.
pub fn resolve_upload(file_name: &str) -> SourceDescriptor {
    SourceDescriptor::LocalUpload {
        file_name: sanitize_file_name(file_name),
    }
}

/// Strip path-unsafe characters from a destination file name.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect();
    if sanitized.is_empty() {
        "upload.bin".to_string()
    } else {
        sanitized
    }
}

/// Extract a drive file id from `id=<id>` or `/d/<id>/` patterns.
fn extract_drive_file_id(url: &str) -> Option<String> {
    for (marker, offset) in [("id=", 3), ("/d/", 3)] {
        if let Some(pos) = url.find(marker) {
            let id: String = url[pos + offset..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect();
            if !id.is_empty() {
                return Some(id);
            }
        }
    }
    None
}
