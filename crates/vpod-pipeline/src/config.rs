//! Pipeline configuration.

use std::io::{IsTerminal, Write};

use tracing::debug;
use vpod_gemini::GeminiConfig;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base directory for per-request workspaces
    pub work_dir: String,
    /// Upload media types accepted from the caller
    pub accepted_upload_exts: Vec<String>,
    /// Dead air longer than this is flagged by the technical agent
    pub silence_threshold_secs: u32,
    /// Chunk size for persisting uploaded byte streams
    pub upload_chunk_bytes: usize,
    /// Maximum upload size handled by the chunked path
    pub max_upload_bytes: u64,
    /// Secret-store file checked before the environment for the API key
    pub secrets_file: String,
    /// Remote service settings
    pub gemini: GeminiConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: "/tmp/vpod".to_string(),
            accepted_upload_exts: ["mp4", "mov", "mp3", "wav", "m4a"]
                .into_iter()
                .map(String::from)
                .collect(),
            silence_threshold_secs: 8,
            upload_chunk_bytes: 10 * 1024 * 1024,
            max_upload_bytes: 10_000 * 1024 * 1024,
            secrets_file: ".secrets".to_string(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("VPOD_WORK_DIR").unwrap_or(defaults.work_dir),
            accepted_upload_exts: std::env::var("VPOD_UPLOAD_TYPES")
                .map(|s| {
                    s.split(',')
                        .map(|ext| ext.trim().to_lowercase())
                        .filter(|ext| !ext.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.accepted_upload_exts),
            silence_threshold_secs: std::env::var("VPOD_SILENCE_THRESHOLD_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.silence_threshold_secs),
            upload_chunk_bytes: std::env::var("VPOD_UPLOAD_CHUNK_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.upload_chunk_bytes),
            max_upload_bytes: std::env::var("VPOD_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            secrets_file: std::env::var("VPOD_SECRETS_FILE").unwrap_or(defaults.secrets_file),
            gemini: GeminiConfig::from_env(),
        }
    }

    /// Whether an uploaded file name carries an accepted media extension.
    pub fn is_accepted_upload(&self, file_name: &str) -> bool {
        file_name
            .rsplit('.')
            .next()
            .map(|ext| {
                self.accepted_upload_exts
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Resolve the API credential.
    ///
    /// Strict priority: secret-store file, then environment variable, then
    /// an interactive terminal prompt. First present wins.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Ok(entries) = dotenvy::from_path_iter(&self.secrets_file) {
            for (key, value) in entries.flatten() {
                if matches!(key.as_str(), "GEMINI_API_KEY" | "GOOGLE_API_KEY")
                    && !value.is_empty()
                {
                    debug!(file = self.secrets_file.as_str(), "API key loaded from secret store");
                    return Some(value);
                }
            }
        }

        for var in ["GEMINI_API_KEY", "GOOGLE_API_KEY"] {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    debug!(var, "API key loaded from environment");
                    return Some(value);
                }
            }
        }

        prompt_for_key()
    }
}

/// Last resort: ask on the terminal. Returns `None` when not interactive.
fn prompt_for_key() -> Option<String> {
    if !std::io::stdin().is_terminal() {
        return None;
    }
    eprint!("Gemini API key: ");
    std::io::stderr().flush().ok();

    let mut line = String::new();
    std::io::stdin().read_line(&mut line).ok()?;
    let key = line.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.work_dir, "/tmp/vpod");
        assert_eq!(config.silence_threshold_secs, 8);
        assert_eq!(config.upload_chunk_bytes, 10 * 1024 * 1024);
        assert_eq!(
            config.accepted_upload_exts,
            vec!["mp4", "mov", "mp3", "wav", "m4a"]
        );
    }

    #[test]
    fn test_is_accepted_upload() {
        let config = PipelineConfig::default();
        assert!(config.is_accepted_upload("episode.mp4"));
        assert!(config.is_accepted_upload("episode.MP3"));
        assert!(config.is_accepted_upload("my.show.m4a"));
        assert!(!config.is_accepted_upload("notes.txt"));
        assert!(!config.is_accepted_upload("noextension"));
    }

    #[test]
    fn test_secret_store_takes_priority_over_environment() {
        let dir = tempfile::TempDir::new().unwrap();
        let secrets = dir.path().join("secrets.env");
        std::fs::write(&secrets, "GEMINI_API_KEY=from-secret-store\n").unwrap();

        let config = PipelineConfig {
            secrets_file: secrets.to_string_lossy().to_string(),
            ..Default::default()
        };

        // Regardless of what the process environment holds, the secret
        // store wins.
        assert_eq!(
            config.resolve_api_key().as_deref(),
            Some("from-secret-store")
        );
    }

    #[test]
    fn test_missing_secret_file_is_not_an_error() {
        let config = PipelineConfig {
            secrets_file: "/nonexistent/secrets.env".to_string(),
            ..Default::default()
        };
        // Falls through to the environment/prompt chain without panicking
        let _ = config.resolve_api_key();
    }
}
