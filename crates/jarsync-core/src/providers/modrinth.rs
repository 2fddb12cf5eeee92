//! Modrinth catalog.
//!
//! Resolution order: a project slug taken from a modrinth.com homepage, then
//! a search per query candidate restricted to plugin-platform categories.

use super::{homepage_on, path_segments, trim_base, CatalogProvider};
use crate::cancel::CancellationToken;
use crate::config::{ArtifactConfig, MatchConfig, NetworkConfig};
use crate::error::Result;
use crate::matching::{query_candidates, score};
use crate::models::{ArtifactDescriptor, ArtifactKind, LookupResult};
use crate::network::HttpClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

const HOST: &str = "modrinth.com";
/// Path prefixes that precede the project slug on modrinth.com.
const PROJECT_PATH_PREFIXES: &[&str] = &["plugin", "mod", "project"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchHit {
    #[serde(default)]
    project_id: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectVersion {
    #[serde(default)]
    version_number: String,
    #[serde(default)]
    date_published: Option<DateTime<Utc>>,
    #[serde(default)]
    files: Vec<VersionFile>,
}

#[derive(Debug, Deserialize)]
struct VersionFile {
    #[serde(default)]
    url: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    primary: bool,
}

/// Resolves generic plugins against the Modrinth API.
pub struct ModrinthProvider {
    http: Arc<HttpClient>,
    base_url: String,
    threshold: u32,
}

impl ModrinthProvider {
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
    ) -> Result<Option<SearchHit>> {
        let facets = format!(
            "[[{}]]",
            MatchConfig::PLUGIN_PLATFORMS
                .iter()
                .map(|p| format!("\"categories:{}\"", p))
                .collect::<Vec<_>>()
                .join(",")
        );
        let url = format!(
            "{}/search?query={}&limit={}&index=relevance&facets={}",
            self.base_url,
            urlencoding::encode(query),
            NetworkConfig::MODRINTH_SEARCH_LIMIT,
            urlencoding::encode(&facets)
        );

        let Some(response) = self.http.get_json::<SearchResponse>(&url, cancel).await? else {
            return Ok(None);
        };

        let mut best: Option<(u32, SearchHit)> = None;
        for hit in response.hits {
            let hit_score = score(target_name, &[&hit.title, &hit.slug]) + category_bonus(&hit.categories);
            if best.as_ref().map_or(true, |(top, _)| hit_score > *top) {
                best = Some((hit_score, hit));
            }
        }

        match best {
            Some((hit_score, hit)) if hit_score >= self.threshold => {
                debug!(
                    "Modrinth match for '{}': {} ({}) score {}",
                    query, hit.title, hit.project_id, hit_score
                );
                Ok(Some(hit))
            }
            Some((hit_score, hit)) => {
                debug!(
                    "Modrinth best hit for '{}' below threshold: {} score {}",
                    query, hit.title, hit_score
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn latest_version(
        &self,
        project: &str,
        display_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<LookupResult>> {
        let loaders = format!(
            "[{}]",
            MatchConfig::PLUGIN_PLATFORMS
                .iter()
                .map(|p| format!("\"{}\"", p))
                .collect::<Vec<_>>()
                .join(",")
        );
        let url = format!(
            "{}/project/{}/version?loaders={}",
            self.base_url,
            urlencoding::encode(project),
            urlencoding::encode(&loaders)
        );

        let Some(mut versions) = self.http.get_json::<Vec<ProjectVersion>>(&url, cancel).await?
        else {
            return Ok(None);
        };

        // Stable sort keeps catalog order among equal timestamps.
        versions.sort_by(|a, b| b.date_published.cmp(&a.date_published));
        let Some(version) = versions.into_iter().find(|v| !v.files.is_empty()) else {
            return Ok(None);
        };

        let Some(file) = select_file(&version.files) else {
            return Ok(None);
        };
        if file.url.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(LookupResult::downloadable(
            self.name(),
            display_name,
            version.version_number,
            file.url.clone(),
            Some(file.filename.clone()).filter(|f| !f.trim().is_empty()),
        )))
    }
}

#[async_trait]
impl CatalogProvider for ModrinthProvider {
    fn name(&self) -> &str {
        "Modrinth"
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

        if let Some(project) = project_from_homepage(artifact.homepage_url.as_deref()) {
            debug!("Trying Modrinth project '{}' from homepage", project);
            if let Some(found) = self.latest_version(&project, &project, cancel).await? {
                return Ok(Some(found));
            }
        }

        let mut checked: HashSet<String> = HashSet::new();
        for query in query_candidates(artifact) {
            cancel.check()?;
            let Some(hit) = self.search_best(&query, &artifact.display_name, cancel).await? else {
                continue;
            };
            if !checked.insert(hit.project_id.to_lowercase()) {
                continue;
            }

            if let Some(found) = self.latest_version(&hit.project_id, &hit.title, cancel).await? {
                info!(
                    "Modrinth resolved {} to {} {}",
                    artifact.display_name, found.project_display_name, found.latest_version_label
                );
                return Ok(Some(found));
            }
        }

        Ok(None)
    }
}

/// Project id or slug from a modrinth.com homepage.
fn project_from_homepage(homepage: Option<&str>) -> Option<String> {
    let url = homepage_on(homepage, HOST)?;
    let segments = path_segments(&url);

    let slug = match segments.as_slice() {
        [] => return None,
        [prefix, slug, ..]
            if PROJECT_PATH_PREFIXES
                .iter()
                .any(|p| prefix.eq_ignore_ascii_case(p)) =>
        {
            slug.clone()
        }
        [.., last] => last.clone(),
    };

    Some(slug).filter(|s| !s.trim().is_empty())
}

fn category_bonus(categories: &[String]) -> u32 {
    let matched = MatchConfig::PLUGIN_PLATFORMS
        .iter()
        .filter(|platform| categories.iter().any(|c| c.eq_ignore_ascii_case(platform)))
        .count() as u32;
    matched * MatchConfig::CATEGORY_BONUS
}

/// Primary file, else the first jar, else the first file.
fn select_file(files: &[VersionFile]) -> Option<&VersionFile> {
    let jar_suffix = format!(".{}", ArtifactConfig::EXTENSION);
    files
        .iter()
        .find(|f| f.primary)
        .or_else(|| {
            files
                .iter()
                .find(|f| f.filename.to_ascii_lowercase().ends_with(&jar_suffix))
        })
        .or_else(|| files.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn provider(base: &str) -> ModrinthProvider {
        let http = HttpClient::with_timeout("Jarsync-Test/1.0", Duration::from_secs(5)).unwrap();
        ModrinthProvider::new(Arc::new(http), base, MatchConfig::ACCEPT_THRESHOLD)
    }

    fn plugin(name: &str, homepage: Option<&str>) -> ArtifactDescriptor {
        ArtifactDescriptor::plugin(
            format!("/srv/plugins/{}-1.0.jar", name),
            name,
            "1.0",
            homepage.map(str::to_string),
        )
    }

    const VERSIONS: &str = r#"[
        {"version_number": "5.3.0", "date_published": "2024-01-01T00:00:00Z",
         "files": [{"url": "https://cdn/old.jar", "filename": "old.jar", "primary": true}]},
        {"version_number": "5.4.1", "date_published": "2024-06-01T00:00:00Z",
         "files": [
            {"url": "https://cdn/sources.zip", "filename": "sources.zip", "primary": false},
            {"url": "https://cdn/LuckPerms-5.4.1.jar", "filename": "LuckPerms-5.4.1.jar", "primary": false}
         ]},
        {"version_number": "6.0-beta", "date_published": "2024-09-01T00:00:00Z", "files": []}
    ]"#;

    #[test]
    fn test_project_from_homepage() {
        assert_eq!(
            project_from_homepage(Some("https://modrinth.com/plugin/luckperms")).as_deref(),
            Some("luckperms")
        );
        assert_eq!(
            project_from_homepage(Some("https://modrinth.com/Project/AbCd1234/versions")).as_deref(),
            Some("AbCd1234")
        );
        assert_eq!(
            project_from_homepage(Some("https://modrinth.com/user/someone")).as_deref(),
            Some("someone")
        );
        assert_eq!(project_from_homepage(Some("https://modrinth.com/")), None);
        assert_eq!(project_from_homepage(Some("https://example.com/plugin/x")), None);
    }

    #[test]
    fn test_category_bonus() {
        let categories = vec!["Paper".to_string(), "spigot".to_string(), "utility".to_string()];
        assert_eq!(category_bonus(&categories), 16);
        assert_eq!(category_bonus(&[]), 0);
    }

    #[test]
    fn test_select_file_priority() {
        let file = |name: &str, primary: bool| VersionFile {
            url: format!("https://cdn/{}", name),
            filename: name.to_string(),
            primary,
        };

        let files = vec![file("a.zip", false), file("b.JAR", false), file("c.jar", true)];
        assert_eq!(select_file(&files).unwrap().filename, "c.jar");

        let files = vec![file("a.zip", false), file("b.JAR", false)];
        assert_eq!(select_file(&files).unwrap().filename, "b.JAR");

        let files = vec![file("a.zip", false)];
        assert_eq!(select_file(&files).unwrap().filename, "a.zip");
        assert!(select_file(&[]).is_none());
    }

    #[tokio::test]
    async fn test_refuses_runtime_artifacts() {
        let mut server = Server::new_async().await;
        let mock = server.mock("GET", Matcher::Any).expect(0).create_async().await;

        let mut runtime = plugin("paper", None);
        runtime.kind = ArtifactKind::ServerRuntime;
        let result = provider(&server.url())
            .try_resolve(&runtime, &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolves_from_homepage() {
        let mut server = Server::new_async().await;
        let _versions = server
            .mock("GET", "/project/luckperms/version")
            .match_query(Matcher::UrlEncoded(
                "loaders".into(),
                r#"["paper","spigot","bukkit","purpur","folia"]"#.into(),
            ))
            .with_status(200)
            .with_body(VERSIONS)
            .create_async()
            .await;
        let search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let artifact = plugin("LuckPerms", Some("https://modrinth.com/plugin/luckperms"));
        let found = provider(&server.url())
            .try_resolve(&artifact, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.provider_name, "Modrinth");
        assert_eq!(found.latest_version_label, "5.4.1");
        assert_eq!(found.download_url.as_deref(), Some("https://cdn/LuckPerms-5.4.1.jar"));
        assert_eq!(found.suggested_file_name.as_deref(), Some("LuckPerms-5.4.1.jar"));
        search.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolves_by_search() {
        let mut server = Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "LuckPerms".into()),
                Matcher::UrlEncoded("index".into(), "relevance".into()),
                Matcher::UrlEncoded("limit".into(), "20".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"hits": [
                    {"project_id": "zzz", "slug": "perms-gui", "title": "PermsGUI", "categories": []},
                    {"project_id": "Vebnzrzj", "slug": "luckperms", "title": "LuckPerms", "categories": ["paper"]}
                ]}"#,
            )
            .create_async()
            .await;
        let _versions = server
            .mock("GET", "/project/Vebnzrzj/version")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(VERSIONS)
            .create_async()
            .await;

        let found = provider(&server.url())
            .try_resolve(&plugin("LuckPerms", None), &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.project_display_name, "LuckPerms");
        assert_eq!(found.latest_version_label, "5.4.1");
    }

    #[tokio::test]
    async fn test_weak_matches_are_rejected() {
        let mut server = Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"hits": [{"project_id": "a", "slug": "worldedit", "title": "WorldEdit", "categories": []}]}"#)
            .create_async()
            .await;
        let versions = server
            .mock("GET", Matcher::Regex(r"^/project/".into()))
            .expect(0)
            .create_async()
            .await;

        let result = provider(&server.url())
            .try_resolve(&plugin("LuckPerms", None), &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.is_none());
        versions.assert_async().await;
    }

    #[tokio::test]
    async fn test_same_project_checked_once() {
        let mut server = Server::new_async().await;
        // Every candidate query (name, stem, stripped stem) finds the same project.
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"hits": [{"project_id": "p1", "slug": "cool", "title": "Cool", "categories": []}]}"#)
            .expect_at_least(2)
            .create_async()
            .await;
        let versions = server
            .mock("GET", "/project/p1/version")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let result = provider(&server.url())
            .try_resolve(&plugin("Cool", None), &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.is_none());
        versions.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_search_is_error() {
        let mut server = Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = provider(&server.url())
            .try_resolve(&plugin("Cool", None), &CancellationToken::new())
            .await;
        assert!(result.unwrap_err().is_provider_error());
    }
}
