//! End-to-end pipeline wiring.
//!
//! One request runs as a cooperative sequence of stages: resolve →
//! acquire → normalize → remote submit → dual-agent analysis. Each stage's
//! output is the next stage's required input; failures surface as one
//! typed error, and workspace teardown runs on every exit path.

use std::path::Path;

use tokio::io::AsyncRead;
use tokio::sync::watch;
use tracing::{info, warn};

use vpod_gemini::GeminiClient;
use vpod_media::{AcquiredMedia, RequestWorkspace};
use vpod_models::EditReport;

use crate::analysis;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::progress::ProgressReporter;

/// The media intake and analysis pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    gemini: GeminiClient,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl Pipeline {
    /// Create a pipeline. The config must carry a resolved API key.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let gemini = GeminiClient::new(config.gemini.clone())?;
        Ok(Self {
            config,
            gemini,
            cancel_rx: None,
        })
    }

    /// Set a cancellation signal observed between polling steps.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Process a URL source into an edit report.
    pub async fn run_url(&self, url: &str) -> PipelineResult<EditReport> {
        let descriptor = vpod_media::resolve(url)?;
        let workspace = RequestWorkspace::create(Path::new(&self.config.work_dir)).await?;
        info!(request_id = workspace.id(), url, "Acquiring source media");

        let result = async {
            let acquired = vpod_media::acquire(&descriptor, workspace.path()).await?;
            self.process_acquired(acquired).await
        }
        .await;

        workspace.cleanup().await;
        result
    }

    /// Process an uploaded byte stream into an edit report.
    pub async fn run_upload<R>(&self, file_name: &str, reader: R) -> PipelineResult<EditReport>
    where
        R: AsyncRead + Unpin,
    {
        if !self.config.is_accepted_upload(file_name) {
            return Err(PipelineError::acquisition(format!(
                "unsupported upload type: {}",
                file_name
            )));
        }

        let workspace = RequestWorkspace::create(Path::new(&self.config.work_dir)).await?;
        info!(
            request_id = workspace.id(),
            file = file_name,
            "Persisting upload"
        );

        let result = async {
            let acquired = vpod_media::persist_upload(
                reader,
                file_name,
                self.config.upload_chunk_bytes,
                self.config.max_upload_bytes,
                workspace.path(),
            )
            .await?;
            self.process_acquired(acquired).await
        }
        .await;

        workspace.cleanup().await;
        result
    }

    /// Shared tail of both entry points: normalize, submit, analyze.
    async fn process_acquired(&self, acquired: AcquiredMedia) -> PipelineResult<EditReport> {
        info!(
            file = acquired.original_name.as_str(),
            size_mb = acquired.size_bytes as f64 / 1_048_576.0,
            "Source media acquired"
        );

        let audio = vpod_media::normalize_audio(acquired).await;

        let progress = ProgressReporter::new("remote_processing");
        let uploaded = self
            .gemini
            .upload_file(&audio.path, &audio.mime_type)
            .await?;
        let ready = self
            .gemini
            .wait_until_active(uploaded, |pct| progress.update(pct), self.cancel_rx.clone())
            .await?;

        info!(remote_name = ready.name.as_str(), "Running dual-agent analysis");
        let report = analysis::analyze(&self.gemini, &ready, &self.config).await?;

        // The remote copy has served its purpose
        if let Err(e) = self.gemini.delete_file(&ready.name).await {
            warn!(error = %e, "Failed to delete remote file (non-fatal)");
        }

        info!(
            teasers = report.teaser_clips.len(),
            trailer = report.trailer_clips.len(),
            shorts = report.short_clips.len(),
            issues = report.issues.len(),
            "Analysis complete"
        );
        Ok(report)
    }
}
