//! PaperMC server runtime builds (fill API v3).

use super::{trim_base, CatalogProvider};
use crate::artifact::PLATFORM_VERSION_PATTERN;
use crate::cancel::CancellationToken;
use crate::config::ArtifactConfig;
use crate::error::Result;
use crate::models::{ArtifactDescriptor, ArtifactKind, LookupResult};
use crate::network::HttpClient;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

const DEFAULT_SERVER_KEY: &str = "server:default";
const SERVER_KEY_PREFIX: &str = "server:";

/// `<platformVersion>-<build>` as carried in a runtime descriptor's version.
static DECLARED_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^(?P<version>{})-\d+$", PLATFORM_VERSION_PATTERN)).unwrap()
});

#[derive(Debug, Deserialize)]
struct Build {
    id: u64,
    #[serde(default)]
    downloads: Option<BTreeMap<String, DownloadEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
struct DownloadEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
}

/// Resolves server runtime jars to the latest build of their platform version.
pub struct PaperProvider {
    http: Arc<HttpClient>,
    base_url: String,
}

impl PaperProvider {
    pub fn new(http: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            http,
            base_url: trim_base(base_url).to_string(),
        }
    }

    async fn latest_build(&self, version: &str, cancel: &CancellationToken) -> Result<Option<Build>> {
        let url = format!(
            "{}/projects/{}/versions/{}/builds/latest",
            self.base_url,
            ArtifactConfig::RUNTIME_PREFIX,
            urlencoding::encode(version)
        );
        self.http.get_json(&url, cancel).await
    }
}

#[async_trait]
impl CatalogProvider for PaperProvider {
    fn name(&self) -> &str {
        "PaperMC"
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::ServerRuntime
    }

    async fn try_resolve(
        &self,
        artifact: &ArtifactDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Option<LookupResult>> {
        if !self.accepts(artifact) {
            return Ok(None);
        }

        let Some(version) = platform_version(artifact) else {
            return Ok(Some(LookupResult::unavailable(
                self.name(),
                ArtifactConfig::RUNTIME_DISPLAY_NAME,
                ArtifactConfig::UNKNOWN_VERSION,
                "cannot determine the platform version",
            )));
        };
        let display_name = format!("{} {}", ArtifactConfig::RUNTIME_DISPLAY_NAME, version);

        let Some(build) = self.latest_build(&version, cancel).await? else {
            debug!("No Paper build found for {}", version);
            return Ok(Some(LookupResult::unavailable(
                self.name(),
                display_name,
                ArtifactConfig::UNKNOWN_VERSION,
                "no build found for this version",
            )));
        };
        let label = format!("{}-{}", version, build.id);

        match build.downloads.as_ref().and_then(select_download) {
            Some(entry) if !entry.name.trim().is_empty() && !entry.url.trim().is_empty() => {
                info!("Paper {} latest build is {}", version, build.id);
                Ok(Some(LookupResult::downloadable(
                    self.name(),
                    display_name,
                    label,
                    entry.url.clone(),
                    Some(entry.name.clone()),
                )))
            }
            _ => Ok(Some(LookupResult::unavailable(
                self.name(),
                display_name,
                label,
                "build has no downloadable server file",
            ))),
        }
    }
}

/// Explicit platform version, else the one embedded in the declared version.
fn platform_version(artifact: &ArtifactDescriptor) -> Option<String> {
    if let Some(version) = artifact
        .runtime_platform_version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(version.to_string());
    }

    DECLARED_VERSION
        .captures(artifact.declared_version.trim())
        .map(|caps| caps["version"].to_string())
}

/// `server:default`, else any `server:` entry with a URL, else any entry with a URL.
fn select_download(downloads: &BTreeMap<String, DownloadEntry>) -> Option<&DownloadEntry> {
    let has_url = |entry: &&DownloadEntry| !entry.url.trim().is_empty();

    downloads
        .get(DEFAULT_SERVER_KEY)
        .filter(has_url)
        .or_else(|| {
            downloads
                .iter()
                .filter(|(key, _)| {
                    key.get(..SERVER_KEY_PREFIX.len())
                        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SERVER_KEY_PREFIX))
                })
                .map(|(_, entry)| entry)
                .find(has_url)
        })
        .or_else(|| downloads.values().find(has_url))
}
