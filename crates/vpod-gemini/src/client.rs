//! Gemini API client.
//!
//! Drives the remote handshake: upload the normalized artifact, poll the
//! file state machine (`Pending → Processing → {Active | Failed}`) until a
//! terminal state, then issue JSON-mime generation requests against the
//! ready handle.

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{GeminiError, GeminiResult};
use crate::types::{
    Content, FileState, GenerateRequest, GenerateResponse, GenerationConfig, Part, RemoteFile,
    UploadResponse,
};

/// Default API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default generation model.
const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API credential
    pub api_key: String,
    /// API endpoint, overridable for tests
    pub base_url: String,
    /// Generation model
    pub model: String,
    /// Delay between state re-queries
    pub poll_interval: Duration,
    /// Overall bound on remote processing; the service can otherwise
    /// process indefinitely
    pub processing_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            poll_interval: Duration::from_millis(500),
            processing_timeout: Duration::from_secs(300),
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            poll_interval: Duration::from_millis(
                std::env::var("GEMINI_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            processing_timeout: Duration::from_secs(
                std::env::var("GEMINI_PROCESSING_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
        }
    }
}

/// Gemini API client.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new client. The API key must already be resolved.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        if config.api_key.is_empty() {
            return Err(GeminiError::MissingApiKey);
        }
        Ok(Self {
            config,
            client: Client::new(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        Self::new(GeminiConfig::from_env())
    }

    /// Upload a local file to the remote file store.
    ///
    /// A failed upload is terminal for the current request; there is no
    /// automatic re-upload.
    pub async fn upload_file(&self, path: &Path, mime_type: &str) -> GeminiResult<RemoteFile> {
        let bytes = tokio::fs::read(path).await?;
        let url = format!(
            "{}/upload/v1beta/files?key={}",
            self.config.base_url, self.config.api_key
        );

        debug!(
            path = %path.display(),
            mime_type,
            size_mb = bytes.len() as f64 / 1_048_576.0,
            "Uploading media to remote service"
        );

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::upload_failed(format!(
                "upload returned {}: {}",
                status, body
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::upload_failed(format!("unparseable upload response: {}", e)))?;

        info!(remote_name = upload.file.name.as_str(), "Media uploaded");
        Ok(upload.file)
    }

    /// Re-query the authoritative state of a remote file.
    pub async fn get_file(&self, name: &str) -> GeminiResult<RemoteFile> {
        let url = format!(
            "{}/v1beta/{}?key={}",
            self.config.base_url, name, self.config.api_key
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::state_query_failed(format!(
                "state query returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GeminiError::state_query_failed(format!("unparseable file resource: {}", e)))
    }

    /// Poll until the remote file leaves `Processing`.
    ///
    /// Each poll is a discrete, cancellable step: a fixed-interval sleep
    /// followed by a state re-query. `on_progress` receives a synthetic
    /// percentage (remote processing time is not predictable) that only
    /// reaches 100 once `Active` is observed. Cancellation attempts a
    /// best-effort remote delete before returning.
    pub async fn wait_until_active<F>(
        &self,
        file: RemoteFile,
        mut on_progress: F,
        cancel_rx: Option<watch::Receiver<bool>>,
    ) -> GeminiResult<RemoteFile>
    where
        F: FnMut(u8),
    {
        let started = Instant::now();
        let mut file = file;
        let mut percent: u8 = 10;
        on_progress(percent);

        loop {
            match file.state {
                FileState::Active => {
                    on_progress(100);
                    info!(
                        remote_name = file.name.as_str(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Remote file ready"
                    );
                    return Ok(file);
                }
                FileState::Failed => {
                    return Err(GeminiError::remote_file_failed(
                        "unsupported or corrupt media",
                    ));
                }
                FileState::Pending | FileState::Processing => {}
            }

            if started.elapsed() >= self.config.processing_timeout {
                return Err(GeminiError::ProcessingTimeout(
                    self.config.processing_timeout.as_secs(),
                ));
            }

            if let Some(rx) = cancel_rx.as_ref() {
                if *rx.borrow() {
                    info!(remote_name = file.name.as_str(), "Polling cancelled");
                    if let Err(e) = self.delete_file(&file.name).await {
                        warn!(error = %e, "Failed to delete remote file on cancel (non-fatal)");
                    }
                    return Err(GeminiError::Cancelled);
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
            percent = (percent + 5).min(95);
            on_progress(percent);
            file = self.get_file(&file.name).await?;
        }
    }

    /// Issue one JSON-mime generation request against a ready file.
    ///
    /// Returns the raw response text; the caller owns parsing, since the
    /// model is only weakly obligated to follow the requested schema.
    pub async fn generate(&self, file: &RemoteFile, prompt: &str) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );

        let mime_type = file
            .mime_type
            .clone()
            .unwrap_or_else(|| "audio/mp3".to_string());

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::file(mime_type, file.uri.clone()), Part::text(prompt)],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::generate_failed(format!(
                "generation returned {}: {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::generate_failed(format!("unparseable response: {}", e)))?;

        let text = generated
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| GeminiError::generate_failed("no content in response"))?;

        Ok(text.to_string())
    }

    /// Delete a remote file. Best-effort cleanup; callers log and continue
    /// on failure.
    pub async fn delete_file(&self, name: &str) -> GeminiResult<()> {
        let url = format!(
            "{}/v1beta/{}?key={}",
            self.config.base_url, name, self.config.api_key
        );

        let response = self.client.delete(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeminiError::state_query_failed(format!(
                "delete returned {}",
                response.status()
            )));
        }

        debug!(remote_name = name, "Remote file deleted");
        Ok(())
    }
}
