//! Media acquisition.
//!
//! Executes the strategy selected by the source resolver and leaves exactly
//! one file at a deterministic path in the request workspace. Every branch
//! streams in bounded chunks; nothing buffers a whole payload in memory.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::source::{sanitize_file_name, SourceDescriptor};

/// Write buffer size for streamed HTTP downloads.
const WRITE_BUFFER_BYTES: usize = 1024 * 1024;

/// Deterministic name for files fetched via the raw-stream fallback.
const DIRECT_DOWNLOAD_NAME: &str = "direct_download.mp4";

/// Output template stem used by the streaming extractor.
const EXTRACTOR_OUTPUT_STEM: &str = "source";

/// A file acquired into the request workspace.
///
/// Owned exclusively by the acquisition step until handed to the
/// normalizer, which deletes it after a successful conversion.
#[derive(Debug, Clone)]
pub struct AcquiredMedia {
    /// Location inside the request workspace
    pub path: PathBuf,
    /// File name the media arrived under
    pub original_name: String,
    /// Size on disk
    pub size_bytes: u64,
}

/// Acquire a URL-based source into `workspace`.
///
/// Upload handles don't go through here; they carry a byte stream and are
/// persisted with [`persist_upload`].
pub async fn acquire(
    descriptor: &SourceDescriptor,
    workspace: &Path,
) -> MediaResult<AcquiredMedia> {
    let client = Client::new();

    match descriptor {
        SourceDescriptor::YouTubeLike { url } => {
            match extract_with_ytdlp(url, workspace).await {
                Ok(media) => Ok(media),
                Err(e) => {
                    remove_extractor_partials(workspace).await;
                    // Some direct-media links are superficially
                    // indistinguishable from platform links; retry those as
                    // a plain stream before giving up.
                    if url.starts_with("http") {
                        warn!(
                            url = url.as_str(),
                            error = %e,
                            "Extractor failed, falling back to raw stream fetch"
                        );
                        fetch_streamed(&client, url, workspace.join(DIRECT_DOWNLOAD_NAME)).await
                    } else {
                        Err(e)
                    }
                }
            }
        }
        SourceDescriptor::CloudDriveShare { file_id } => {
            let endpoint = format!(
                "https://drive.google.com/uc?export=download&id={}",
                file_id
            );
            let file_name = format!("drive_{}.mp4", file_id);
            fetch_streamed(&client, &endpoint, workspace.join(file_name)).await
        }
        SourceDescriptor::DropboxShare { url } | SourceDescriptor::DirectUrl { url } => {
            fetch_streamed(&client, url, workspace.join(DIRECT_DOWNLOAD_NAME)).await
        }
        SourceDescriptor::LocalUpload { file_name } => Err(MediaError::download_failed(format!(
            "upload '{}' carries a byte stream; persist it with persist_upload",
            file_name
        ))),
    }
}

/// Persist an uploaded byte stream to the workspace in fixed-size chunks.
///
/// The stream is never materialized whole: each chunk is read to `chunk_bytes`
/// (or EOF) and written with a single write call. The reader is dropped as
/// soon as the loop completes so its backing memory can be reclaimed while
/// the rest of the pipeline runs.
pub async fn persist_upload<R>(
    mut reader: R,
    file_name: &str,
    chunk_bytes: usize,
    max_bytes: u64,
    workspace: &Path,
) -> MediaResult<AcquiredMedia>
where
    R: AsyncRead + Unpin,
{
    let safe_name = sanitize_file_name(file_name);
    let dest = workspace.join(&safe_name);
    let mut file = File::create(&dest).await?;

    let result = write_chunked(&mut reader, &mut file, chunk_bytes, max_bytes).await;
    drop(reader);

    match result {
        Ok((size_bytes, chunk_writes)) => {
            info!(
                file = safe_name.as_str(),
                size_mb = size_bytes as f64 / 1_048_576.0,
                chunk_writes,
                "Upload persisted"
            );
            Ok(AcquiredMedia {
                path: dest,
                original_name: safe_name,
                size_bytes,
            })
        }
        Err(e) => {
            remove_partial(&dest).await;
            Err(e)
        }
    }
}

/// Chunked copy loop. Returns total bytes and the number of chunk writes.
async fn write_chunked<R, W>(
    reader: &mut R,
    writer: &mut W,
    chunk_bytes: usize,
    max_bytes: u64,
) -> MediaResult<(u64, u64)>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; chunk_bytes];
    let mut total = 0u64;
    let mut chunk_writes = 0u64;

    loop {
        let filled = fill_chunk(reader, &mut buf).await?;
        if filled == 0 {
            break;
        }
        total += filled as u64;
        if total > max_bytes {
            return Err(MediaError::UploadTooLarge {
                size_bytes: total,
                max_bytes,
            });
        }
        writer.write_all(&buf[..filled]).await?;
        chunk_writes += 1;
        if filled < chunk_bytes {
            break;
        }
    }

    writer.flush().await?;
    Ok((total, chunk_writes))
}

/// Read until the buffer is full or the stream ends.
async fn fill_chunk<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> MediaResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Resolve the extractor binary, overridable for environments that stage a
/// stand-in on a different path.
fn ytdlp_bin() -> String {
    std::env::var("VPOD_YTDLP_BIN").unwrap_or_else(|_| "yt-dlp".to_string())
}

/// Run the streaming extractor, preferring audio-only streams.
async fn extract_with_ytdlp(url: &str, workspace: &Path) -> MediaResult<AcquiredMedia> {
    let bin = ytdlp_bin();
    which::which(&bin).map_err(|_| MediaError::YtDlpNotFound)?;

    let template = workspace.join(format!("{}.%(ext)s", EXTRACTOR_OUTPUT_STEM));
    let template_str = template.to_string_lossy().to_string();

    debug!(url, "Running extractor: {} -o {}", bin, template_str);

    let output = Command::new(&bin)
        .args([
            // Audio-only keeps the upload small; worst combined stream is
            // the fallback when no audio-only stream exists.
            "-f",
            "bestaudio/worst",
            "--no-playlist",
            "--quiet",
            "--no-warnings",
            "-o",
            template_str.as_str(),
            url,
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("Extractor stderr: {}", stderr);
        return Err(MediaError::download_failed(format!(
            "extractor failed: {}",
            stderr.lines().last().unwrap_or("unknown error")
        )));
    }

    find_extractor_output(workspace).await
}

/// Locate the single file the extractor wrote under the output template.
async fn find_extractor_output(workspace: &Path) -> MediaResult<AcquiredMedia> {
    let prefix = format!("{}.", EXTRACTOR_OUTPUT_STEM);
    let mut entries = tokio::fs::read_dir(workspace).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(&prefix) {
            let metadata = entry.metadata().await?;
            info!(
                file = name.as_str(),
                size_mb = metadata.len() as f64 / 1_048_576.0,
                "Extractor download complete"
            );
            return Ok(AcquiredMedia {
                path: entry.path(),
                original_name: name,
                size_bytes: metadata.len(),
            });
        }
    }

    Err(MediaError::download_failed(
        "extractor reported success but produced no output file",
    ))
}

/// Streamed HTTP GET, written incrementally through a bounded buffer.
async fn fetch_streamed(client: &Client, url: &str, dest: PathBuf) -> MediaResult<AcquiredMedia> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(MediaError::download_failed(format!(
            "GET {} returned {}",
            url,
            response.status()
        )));
    }

    let original_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| DIRECT_DOWNLOAD_NAME.to_string());

    let file = File::create(&dest).await?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_BYTES, file);
    let mut stream = response.bytes_stream();

    let copy_result: MediaResult<u64> = async {
        let mut total = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            total += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(total)
    }
    .await;

    match copy_result {
        Ok(size_bytes) => {
            info!(
                url,
                size_mb = size_bytes as f64 / 1_048_576.0,
                "Streamed download complete"
            );
            Ok(AcquiredMedia {
                path: dest,
                original_name,
                size_bytes,
            })
        }
        Err(e) => {
            remove_partial(&dest).await;
            Err(e)
        }
    }
}

/// Remove anything a failed extractor run left behind so the fallback (or
/// the error path) sees a clean workspace.
async fn remove_extractor_partials(workspace: &Path) {
    let prefix = format!("{}.", EXTRACTOR_OUTPUT_STEM);
    if let Ok(mut entries) = tokio::fs::read_dir(workspace).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&prefix) {
                remove_partial(&entry.path()).await;
            }
        }
    }
}

/// Remove a partially-written target file after a failed transfer.
async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove partial download (non-fatal)"
        );
    }
}
