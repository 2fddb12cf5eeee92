//! Spiget, the API mirror of spigotmc.org resources.

use super::{homepage_on, path_segments, trim_base, CatalogProvider};
use crate::cancel::CancellationToken;
use crate::config::{ArtifactConfig, NetworkConfig};
use crate::error::Result;
use crate::matching::{query_candidates, score};
use crate::models::{ArtifactDescriptor, ArtifactKind, LookupResult};
use crate::network::HttpClient;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

const HOST: &str = "spigotmc.org";
/// `existenceStatus` of a resource that has not been removed.
const EXISTING: i32 = 1;

const PREMIUM_NOTE: &str = "premium resources cannot be downloaded through the API";
const EXTERNAL_NOTE: &str = "externally hosted; automatic download unsupported";
const EXTERNAL_URL_NOTE: &str = "downloaded from external URL";

/// `resources/<slug>.<id>` as used in spigotmc.org resource URLs.
static SLUG_WITH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)resources/[^/]*\.(\d+)").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Resource {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    external: bool,
    #[serde(default)]
    premium: bool,
    #[serde(default)]
    existence_status: i32,
    #[serde(default)]
    file: Option<ResourceFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceFile {
    #[serde(default)]
    external_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceVersion {
    #[serde(default)]
    name: String,
}

/// Resolves generic plugins against the Spiget API.
pub struct SpigetProvider {
    http: Arc<HttpClient>,
    base_url: String,
    threshold: u32,
}

impl SpigetProvider {
    pub fn new(http: Arc<HttpClient>, base_url: &str, threshold: u32) -> Self {
        Self {
            http,
            base_url: trim_base(base_url).to_string(),
            threshold,
        }
    }

    async fn search_best(
        &self,
        query: &str,
        target_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Resource>> {
        let url = format!(
            "{}/search/resources/{}?size={}",
            self.base_url,
            urlencoding::encode(query),
            NetworkConfig::SPIGET_SEARCH_SIZE
        );
        let Some(resources) = self.http.get_json::<Vec<Resource>>(&url, cancel).await? else {
            return Ok(None);
        };

        let mut best: Option<(u32, Resource)> = None;
        for resource in resources.into_iter().filter(|r| r.existence_status == EXISTING) {
            let resource_score = score(target_name, &[&resource.name, &resource.tag]);
            if best.as_ref().map_or(true, |(top, _)| resource_score > *top) {
                best = Some((resource_score, resource));
            }
        }

        Ok(best
            .filter(|(resource_score, _)| *resource_score >= self.threshold)
            .map(|(resource_score, resource)| {
                debug!(
                    "Spiget match for '{}': {} ({}) score {}",
                    query, resource.name, resource.id, resource_score
                );
                resource
            }))
    }

    async fn by_id(&self, id: u64, cancel: &CancellationToken) -> Result<Option<LookupResult>> {
        let url = format!("{}/resources/{}", self.base_url, id);
        match self.http.get_json::<Resource>(&url, cancel).await? {
            Some(resource) => self.lookup(&resource, cancel).await,
            None => Ok(None),
        }
    }

    async fn lookup(
        &self,
        resource: &Resource,
        cancel: &CancellationToken,
    ) -> Result<Option<LookupResult>> {
        if resource.premium {
            return Ok(Some(LookupResult::unavailable(
                self.name(),
                &resource.name,
                ArtifactConfig::UNKNOWN_VERSION,
                PREMIUM_NOTE,
            )));
        }

        let url = format!("{}/resources/{}/versions/latest", self.base_url, resource.id);
        let Some(version) = self.http.get_json::<ResourceVersion>(&url, cancel).await? else {
            return Ok(None);
        };
        let suggested = format!(
            "{}-{}.{}",
            resource.name,
            version.name,
            ArtifactConfig::EXTENSION
        );

        if resource.external {
            let external_url = resource
                .file
                .as_ref()
                .and_then(|f| f.external_url.as_deref())
                .map(str::trim)
                .filter(|u| is_jar_url(u));

            return Ok(Some(match external_url {
                Some(external_url) => LookupResult::downloadable(
                    self.name(),
                    &resource.name,
                    version.name,
                    external_url,
                    Some(suggested),
                )
                .with_note(EXTERNAL_URL_NOTE),
                None => LookupResult::unavailable(
                    self.name(),
                    &resource.name,
                    version.name,
                    EXTERNAL_NOTE,
                ),
            }));
        }

        Ok(Some(LookupResult::downloadable(
            self.name(),
            &resource.name,
            version.name,
            format!("{}/resources/{}/download", self.base_url, resource.id),
            Some(suggested),
        )))
    }
}

#[async_trait]
impl CatalogProvider for SpigetProvider {
    fn name(&self) -> &str {
        "Spiget"
    }

    fn kind(&self) -> ArtifactKind {
        ArtifactKind::GenericPlugin
    }

    async fn try_resolve(
        &self,
        artifact: &ArtifactDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Option<LookupResult>> {
        if !self.accepts(artifact) {
            return Ok(None);
        }

        if let Some(id) = resource_id_from_homepage(artifact.homepage_url.as_deref()) {
            debug!("Trying Spiget resource {} from homepage", id);
            if let Some(found) = self.by_id(id, cancel).await? {
                return Ok(Some(found));
            }
        }

        for query in query_candidates(artifact) {
            cancel.check()?;
            let Some(resource) = self.search_best(&query, &artifact.display_name, cancel).await?
            else {
                continue;
            };
            if let Some(found) = self.lookup(&resource, cancel).await? {
                info!(
                    "Spiget resolved {} to resource {} ({})",
                    artifact.display_name, resource.id, found.latest_version_label
                );
                return Ok(Some(found));
            }
        }

        Ok(None)
    }
}

/// Numeric resource id from a spigotmc.org resource URL.
fn resource_id_from_homepage(homepage: Option<&str>) -> Option<u64> {
    let url = homepage_on(homepage, HOST)?;

    if let Some(id) = SLUG_WITH_ID
        .captures(url.path())
        .and_then(|caps| caps[1].parse().ok())
    {
        return Some(id);
    }

    let segments = path_segments(&url);
    let position = segments
        .iter()
        .position(|s| s.eq_ignore_ascii_case("resources"))?;
    let next = segments.get(position + 1)?;
    DIGITS.find(next)?.as_str().parse().ok()
}

fn is_jar_url(url: &str) -> bool {
    url.to_ascii_lowercase()
        .ends_with(&format!(".{}", ArtifactConfig::EXTENSION))
}
