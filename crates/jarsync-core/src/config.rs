//! Centralized configuration for Jarsync.
//!
//! Constant tables describe fixed protocol details (catalog endpoints,
//! artifact naming, scoring weights). [`UpdaterConfig`] is the run-time
//! value that callers construct explicitly and hand to the updater.

use crate::error::{JarsyncError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "Jarsync";
    pub const USER_AGENT: &'static str = "Jarsync/1.0";
    pub const DEFAULT_OUTPUT_SUBDIR: &'static str = "PluginUpdates";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
    pub const MODRINTH_API_BASE: &'static str = "https://api.modrinth.com/v2";
    pub const SPIGET_API_BASE: &'static str = "https://api.spiget.org/v2";
    pub const PAPER_API_BASE: &'static str = "https://fill.papermc.io/v3";
    pub const MODRINTH_SEARCH_LIMIT: u32 = 20;
    pub const SPIGET_SEARCH_SIZE: u32 = 20;
}

/// Name-matching weights and thresholds.
pub struct MatchConfig;

impl MatchConfig {
    pub const ACCEPT_THRESHOLD: u32 = 50;
    pub const EXACT_BONUS: u32 = 120;
    pub const PREFIX_BONUS: u32 = 70;
    pub const SUBSTRING_BONUS: u32 = 45;
    pub const TOKEN_BONUS: u32 = 12;
    pub const CATEGORY_BONUS: u32 = 8;
    /// Plugin-platform categories/loaders recognised on Modrinth.
    pub const PLUGIN_PLATFORMS: &'static [&'static str] =
        &["paper", "spigot", "bukkit", "purpur", "folia"];
}

/// Local artifact conventions.
pub struct ArtifactConfig;

impl ArtifactConfig {
    pub const EXTENSION: &'static str = "jar";
    pub const DESCRIPTOR_FILE: &'static str = "plugin.yml";
    pub const UNKNOWN_VERSION: &'static str = "unknown";
    pub const RUNTIME_PREFIX: &'static str = "paper";
    pub const RUNTIME_DISPLAY_NAME: &'static str = "Paper";
    pub const RUNTIME_HOMEPAGE: &'static str = "https://papermc.io";
}

/// Download behaviour.
pub struct DownloadConfig;

impl DownloadConfig {
    pub const MAX_NAME_PROBES: u32 = 999;
}

/// Base URLs of the three catalogs.
///
/// Overridable so the pipeline can be pointed at mirrors or test servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    pub modrinth: String,
    pub spiget: String,
    pub paper: String,
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            modrinth: NetworkConfig::MODRINTH_API_BASE.to_string(),
            spiget: NetworkConfig::SPIGET_API_BASE.to_string(),
            paper: NetworkConfig::PAPER_API_BASE.to_string(),
        }
    }
}

impl CatalogEndpoints {
    /// Point every catalog at the same base URL (useful for a single mock server).
    pub fn all(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            modrinth: base.clone(),
            spiget: base.clone(),
            paper: base,
        }
    }
}

/// Run-time configuration for one update run.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Directory downloaded files are written to.
    pub output_dir: PathBuf,
    /// Minimum name-match score for a catalog project to be accepted.
    pub match_threshold: u32,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Total timeout for catalog requests.
    pub request_timeout: Duration,
    /// Catalog base URLs.
    pub endpoints: CatalogEndpoints,
    /// Number of artifacts resolved concurrently (1 = sequential).
    pub parallelism: usize,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            match_threshold: MatchConfig::ACCEPT_THRESHOLD,
            user_agent: AppConfig::USER_AGENT.to_string(),
            request_timeout: NetworkConfig::REQUEST_TIMEOUT,
            endpoints: CatalogEndpoints::default(),
            parallelism: 1,
        }
    }
}

impl UpdaterConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> UpdaterConfigBuilder {
        UpdaterConfigBuilder::default()
    }

    /// Ensure the output directory exists and is writable.
    ///
    /// Creates the directory when missing. Called once before any artifact
    /// is processed; a failure here is fatal to the run.
    pub fn validate_output_dir(&self) -> Result<()> {
        validate_dir(&self.output_dir)
    }
}

fn validate_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(JarsyncError::Config {
            message: "output directory is empty".to_string(),
        });
    }

    if dir.exists() && !dir.is_dir() {
        return Err(JarsyncError::Config {
            message: format!("output path is not a directory: {}", dir.display()),
        });
    }

    std::fs::create_dir_all(dir).map_err(|e| JarsyncError::Config {
        message: format!("cannot create output directory {}: {}", dir.display(), e),
    })?;

    let metadata = std::fs::metadata(dir).map_err(|e| JarsyncError::Config {
        message: format!("cannot inspect output directory {}: {}", dir.display(), e),
    })?;
    if metadata.permissions().readonly() {
        return Err(JarsyncError::Config {
            message: format!("output directory is read-only: {}", dir.display()),
        });
    }

    Ok(())
}

/// `~/Downloads/PluginUpdates`, falling back to the working directory.
pub fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(AppConfig::DEFAULT_OUTPUT_SUBDIR)
}

/// Builder for [`UpdaterConfig`].
#[derive(Debug, Default)]
pub struct UpdaterConfigBuilder {
    config: UpdaterConfig,
}

impl UpdaterConfigBuilder {
    /// Set the output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the minimum accepted match score.
    pub fn match_threshold(mut self, threshold: u32) -> Self {
        self.config.match_threshold = threshold;
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the catalog request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Override catalog base URLs.
    pub fn endpoints(mut self, endpoints: CatalogEndpoints) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    /// Resolve up to `n` artifacts at once.
    pub fn parallelism(mut self, n: usize) -> Self {
        self.config.parallelism = n.max(1);
        self
    }

    pub fn build(self) -> UpdaterConfig {
        self.config
    }
}
