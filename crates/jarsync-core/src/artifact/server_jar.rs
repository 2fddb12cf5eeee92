//! Server runtime jars are identified purely by file name:
//! `paper-<platformVersion>-<build>.jar`.

use crate::config::ArtifactConfig;
use crate::error::{JarsyncError, Result};
use crate::models::{file_stem, ArtifactDescriptor, ArtifactKind};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Pattern for a platform version such as `1.21.4`, `1.20` or `1.21-rc1`.
pub(crate) const PLATFORM_VERSION_PATTERN: &str = r"\d+\.\d+(?:\.\d+)?(?:-(?:pre|rc)\d+)?";

static RUNTIME_STEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^{}-(?P<version>{})-(?P<build>\d+)$",
        regex::escape(ArtifactConfig::RUNTIME_PREFIX),
        PLATFORM_VERSION_PATTERN
    ))
    .expect("runtime jar pattern is valid")
});

/// Whether a file name follows the runtime jar convention.
pub fn is_runtime_jar(path: &Path) -> bool {
    RUNTIME_STEM.is_match(&file_stem(path))
}

/// Build a descriptor from a runtime jar's file name.
pub fn read_server_jar(path: &Path) -> Result<ArtifactDescriptor> {
    let stem = file_stem(path);
    let caps = RUNTIME_STEM.captures(&stem).ok_or_else(|| {
        JarsyncError::metadata(
            path,
            format!(
                "not named {}-<version>-<build>.{}",
                ArtifactConfig::RUNTIME_PREFIX,
                ArtifactConfig::EXTENSION
            ),
        )
    })?;

    let version = caps["version"].to_string();
    let build: u32 = caps["build"]
        .parse()
        .map_err(|_| JarsyncError::metadata(path, "build number is out of range"))?;

    Ok(ArtifactDescriptor {
        source_path: path.to_path_buf(),
        display_name: ArtifactConfig::RUNTIME_DISPLAY_NAME.to_string(),
        declared_version: format!("{}-{}", version, build),
        homepage_url: Some(ArtifactConfig::RUNTIME_HOMEPAGE.to_string()),
        kind: ArtifactKind::ServerRuntime,
        runtime_platform_version: Some(version),
        runtime_build_number: Some(build),
        status: "parsed".to_string(),
    })
}
