//! Resolution orchestrator.
//!
//! [`Updater`] owns the provider chain, the shared HTTP client and the
//! downloader for one run. For every artifact it tries providers in order and
//! produces exactly one [`UpdateOutcome`]:
//! - a provider error or a non-downloadable result is recorded and the next
//!   provider is tried
//! - a downloadable result whose version equals the installed one stops the
//!   chain with `AlreadyLatest`
//! - otherwise the file is downloaded; success stops the chain with `Updated`,
//!   failure is recorded and the chain continues

mod progress;
mod version;

pub use progress::ProgressEvent;
pub use version::{is_same_version, normalize_version};

use crate::artifact::WorkingSet;
use crate::cancel::CancellationToken;
use crate::config::UpdaterConfig;
use crate::error::{JarsyncError, Result};
use crate::models::{ArtifactDescriptor, LookupResult, RunSummary, UpdateOutcome, UpdateStatus};
use crate::network::{Downloader, HttpClient};
use crate::providers::{default_providers, DynProvider};
use futures::stream::{self, StreamExt};
use progress::ProgressSink;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Failure message when no provider recorded anything.
pub const NO_SOURCE_MESSAGE: &str = "no source found or auto-download unsupported";
pub const ALREADY_LATEST_MESSAGE: &str = "already the latest version";
/// Descriptor status while an artifact is being resolved.
pub const CHECKING_STATUS: &str = "checking for updates...";

/// Runs the resolution pipeline over a set of artifacts.
pub struct Updater {
    config: UpdaterConfig,
    providers: Vec<DynProvider>,
    downloader: Downloader,
}

impl Updater {
    /// Create an updater with the standard provider chain.
    pub fn new(config: UpdaterConfig) -> Result<Self> {
        let http = Arc::new(HttpClient::new(&config)?);
        let providers = default_providers(http.clone(), &config);
        Ok(Self {
            config,
            providers,
            downloader: Downloader::new(http),
        })
    }

    /// Create an updater with an explicit provider chain, tried in order.
    pub fn with_providers(config: UpdaterConfig, providers: Vec<DynProvider>) -> Result<Self> {
        let http = Arc::new(HttpClient::new(&config)?);
        Ok(Self {
            config,
            providers,
            downloader: Downloader::new(http),
        })
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub fn providers(&self) -> &[DynProvider] {
        &self.providers
    }

    /// Check every artifact of the working set and download what is outdated.
    ///
    /// Fails only when the output directory is unusable, before any artifact
    /// is touched. Otherwise returns one outcome per artifact, in working set
    /// order. Each descriptor's `status` is updated as it is processed.
    pub async fn run(
        &self,
        set: &mut WorkingSet,
        cancel: &CancellationToken,
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Result<Vec<UpdateOutcome>> {
        self.config.validate_output_dir()?;

        let sink = ProgressSink::new(progress);
        let sink = &sink;
        let total = set.len();
        info!(
            "Checking {} artifacts into {} ({} at a time)",
            total,
            self.config.output_dir.display(),
            self.config.parallelism
        );
        sink.emit(ProgressEvent::Started { total });

        let outcomes: Vec<UpdateOutcome> = stream::iter(set.artifacts_mut().iter_mut().enumerate())
            .map(|(index, artifact)| async move {
                sink.emit(ProgressEvent::ArtifactStarted {
                    index,
                    name: artifact.display_name.clone(),
                });
                artifact.status = CHECKING_STATUS.to_string();

                let outcome = self.resolve_artifact(artifact, index, cancel, sink).await;

                artifact.status = outcome.status.label().to_string();
                sink.emit(ProgressEvent::ArtifactFinished {
                    index,
                    outcome: outcome.clone(),
                });
                outcome
            })
            .buffered(self.config.parallelism.max(1))
            .collect()
            .await;

        let summary = RunSummary::from_outcomes(&outcomes);
        info!("{}", summary);
        sink.emit(ProgressEvent::Finished { summary });
        Ok(outcomes)
    }

    /// Resolve a single artifact without progress reporting.
    pub async fn resolve(
        &self,
        artifact: &ArtifactDescriptor,
        cancel: &CancellationToken,
    ) -> UpdateOutcome {
        self.resolve_artifact(artifact, 0, cancel, &ProgressSink::default())
            .await
    }

    async fn resolve_artifact(
        &self,
        artifact: &ArtifactDescriptor,
        index: usize,
        cancel: &CancellationToken,
        sink: &ProgressSink,
    ) -> UpdateOutcome {
        if cancel.is_cancelled() {
            return cancelled(artifact);
        }

        let mut notes: Vec<String> = Vec::new();

        for provider in &self.providers {
            if !provider.accepts(artifact) {
                continue;
            }
            sink.emit(ProgressEvent::ProviderAttempt {
                index,
                provider: provider.name().to_string(),
            });

            let lookup = match provider.try_resolve(artifact, cancel).await {
                Ok(Some(lookup)) => lookup,
                Ok(None) => {
                    debug!("{}: nothing found for {}", provider.name(), artifact.display_name);
                    continue;
                }
                Err(e) if e.is_cancelled() => return cancelled(artifact),
                Err(e) => {
                    warn!("{} failed for {}: {}", provider.name(), artifact.display_name, e);
                    notes.push(format!("{}: {}", provider.name(), e.short_message()));
                    continue;
                }
            };

            if !lookup.can_download() {
                if let Some(note) = lookup.note.as_deref().filter(|n| !n.trim().is_empty()) {
                    notes.push(format!("{}: {}", provider.name(), note));
                }
                continue;
            }

            if is_same_version(&artifact.declared_version, &lookup.latest_version_label) {
                info!(
                    "{} is already at {} ({})",
                    artifact.display_name, lookup.latest_version_label, lookup.provider_name
                );
                return outcome_for(
                    artifact,
                    &lookup,
                    UpdateStatus::AlreadyLatest,
                    None,
                    ALREADY_LATEST_MESSAGE.to_string(),
                );
            }

            if let Some(url) = lookup.download_url.as_deref() {
                sink.emit(ProgressEvent::Downloading {
                    index,
                    url: url.to_string(),
                });
            }

            match self
                .downloader
                .download(artifact, &lookup, &self.config.output_dir, cancel)
                .await
            {
                Ok(path) => {
                    let message = match lookup.note.as_deref() {
                        Some(note) => format!("{} ({})", lookup.project_display_name, note),
                        None => lookup.project_display_name.clone(),
                    };
                    return outcome_for(artifact, &lookup, UpdateStatus::Updated, Some(path), message);
                }
                Err(e) if e.is_cancelled() => return cancelled(artifact),
                Err(e) => {
                    warn!(
                        "Download from {} failed for {}: {}",
                        provider.name(),
                        artifact.display_name,
                        e
                    );
                    notes.push(format!("{}: {}", provider.name(), e.short_message()));
                }
            }
        }

        let message = if notes.is_empty() {
            NO_SOURCE_MESSAGE.to_string()
        } else {
            notes.join(" / ")
        };
        UpdateOutcome::failed(&artifact.display_name, &artifact.declared_version, message)
    }
}

fn outcome_for(
    artifact: &ArtifactDescriptor,
    lookup: &LookupResult,
    status: UpdateStatus,
    saved_path: Option<PathBuf>,
    message: String,
) -> UpdateOutcome {
    UpdateOutcome {
        artifact_name: artifact.display_name.clone(),
        previous_version: artifact.declared_version.clone(),
        resolved_version: lookup.latest_version_label.clone(),
        provider: lookup.provider_name.clone(),
        status,
        saved_path,
        message,
    }
}

fn cancelled(artifact: &ArtifactDescriptor) -> UpdateOutcome {
    UpdateOutcome::failed(
        &artifact.display_name,
        &artifact.declared_version,
        JarsyncError::Cancelled.to_string(),
    )
}
