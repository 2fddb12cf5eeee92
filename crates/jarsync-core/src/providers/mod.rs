//! Catalog providers.
//!
//! Each provider resolves an [`ArtifactDescriptor`] to the latest build one
//! remote catalog knows about:
//! - [`ModrinthProvider`] - plugins, by project slug or search
//! - [`SpigetProvider`] - plugins, by spigotmc.org resource id or search
//! - [`PaperProvider`] - server runtime builds
//!
//! The updater treats them uniformly through [`CatalogProvider`]; only the
//! order of [`default_providers`] expresses priority.

mod modrinth;
mod paper;
mod spiget;

pub use modrinth::ModrinthProvider;
pub use paper::PaperProvider;
pub use spiget::SpigetProvider;

use crate::cancel::CancellationToken;
use crate::config::UpdaterConfig;
use crate::error::Result;
use crate::models::{ArtifactDescriptor, ArtifactKind, LookupResult};
use crate::network::{extract_domain, HttpClient};
use async_trait::async_trait;
use std::sync::Arc;

/// A remote catalog able to resolve artifacts of one kind.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Name recorded in outcomes and failure messages (e.g. "Modrinth").
    fn name(&self) -> &str;

    /// The artifact kind this provider handles.
    fn kind(&self) -> ArtifactKind;

    /// Whether this provider may handle the artifact at all.
    fn accepts(&self, artifact: &ArtifactDescriptor) -> bool {
        artifact.kind == self.kind()
    }

    /// Look up the latest build of an artifact.
    ///
    /// `Ok(None)` means the catalog has nothing usable, including when the
    /// artifact is of a kind this provider does not handle. Errors are
    /// transport or decoding failures talking to the catalog.
    async fn try_resolve(
        &self,
        artifact: &ArtifactDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Option<LookupResult>>;
}

/// Shared handle to a provider.
pub type DynProvider = Arc<dyn CatalogProvider>;

/// The standard provider chain: Modrinth, then Spiget, then Paper.
pub fn default_providers(http: Arc<HttpClient>, config: &UpdaterConfig) -> Vec<DynProvider> {
    vec![
        Arc::new(ModrinthProvider::new(
            http.clone(),
            &config.endpoints.modrinth,
            config.match_threshold,
        )),
        Arc::new(SpigetProvider::new(
            http.clone(),
            &config.endpoints.spiget,
            config.match_threshold,
        )),
        Arc::new(PaperProvider::new(http, &config.endpoints.paper)),
    ]
}

/// Parse a homepage URL if its host contains `domain`.
pub(crate) fn homepage_on(homepage: Option<&str>, domain: &str) -> Option<url::Url> {
    let homepage = homepage?.trim();
    let host = extract_domain(homepage)?;
    if !host.contains(domain) {
        return None;
    }
    url::Url::parse(homepage).ok()
}

/// Path segments of a URL, without empty segments.
pub(crate) fn path_segments(url: &url::Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| urlencoding::decode(s).map_or_else(|_| s.to_string(), |d| d.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}
