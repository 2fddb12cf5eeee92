//! Streams a resolved artifact into the output directory.
//!
//! The destination is reserved atomically (see
//! [`reserve_unique_path`](super::filename::reserve_unique_path)) and written
//! in place. Any failure after reservation, including cancellation, removes
//! the partial file so no half-written jar is left behind.

use crate::cancel::CancellationToken;
use crate::error::{JarsyncError, Result};
use crate::models::{ArtifactDescriptor, LookupResult};
use crate::network::client::HttpClient;
use crate::network::filename::{choose_file_name, reserve_unique_path};
use futures::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Response;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Downloads resolved artifacts.
#[derive(Debug, Clone)]
pub struct Downloader {
    http: Arc<HttpClient>,
}

impl Downloader {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Download the file a lookup points at into `output_dir`.
    ///
    /// Returns the path actually written, which carries a ` (n)` suffix when
    /// the preferred name was taken.
    pub async fn download(
        &self,
        artifact: &ArtifactDescriptor,
        lookup: &LookupResult,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let url = lookup
            .download_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| JarsyncError::DownloadFailed {
                url: String::new(),
                message: "no download URL".to_string(),
            })?;

        let response = self.http.get_download(url, cancel).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JarsyncError::DownloadFailed {
                url: url.to_string(),
                message: format!("server returned {}", status),
            });
        }

        let content_type = header_str(&response, CONTENT_TYPE.as_str()).unwrap_or_default();
        if content_type.to_ascii_lowercase().contains("text/html") {
            warn!("{} answered with {}, refusing to save", url, content_type);
            return Err(JarsyncError::UnsupportedRedirect {
                url: url.to_string(),
                content_type,
            });
        }

        let file_name = choose_file_name(
            header_str(&response, CONTENT_DISPOSITION.as_str()).as_deref(),
            lookup.suggested_file_name.as_deref(),
            &artifact.display_name,
            &lookup.latest_version_label,
        );

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| JarsyncError::io_with_path(e, output_dir))?;
        let (path, file) = reserve_unique_path(output_dir, &file_name)?;
        debug!("Saving {} to {}", url, path.display());

        match write_body(response, tokio::fs::File::from_std(file), &path, cancel).await {
            Ok(bytes) => {
                info!("Downloaded {} bytes to {}", bytes, path.display());
                Ok(path)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    warn!(
                        "Failed to remove partial download {}: {}",
                        path.display(),
                        remove_err
                    );
                }
                Err(e)
            }
        }
    }
}

async fn write_body(
    response: Response,
    mut file: tokio::fs::File,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<u64> {
    let url = response.url().to_string();
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    loop {
        let next = cancel.guard(async { Ok(stream.next().await) }).await?;
        let Some(chunk) = next else {
            break;
        };
        let chunk = chunk.map_err(|e| JarsyncError::DownloadFailed {
            url: url.clone(),
            message: format!("error reading download stream: {}", e),
        })?;

        file.write_all(&chunk)
            .await
            .map_err(|e| JarsyncError::io_with_path(e, path))?;
        bytes_written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| JarsyncError::io_with_path(e, path))?;
    Ok(bytes_written)
}

fn header_str(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
