//! Identity of a local artifact.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which family of catalogs can resolve an artifact.
///
/// The kind is a hard partition: providers for one kind never handle the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A plugin jar carrying an embedded `plugin.yml`.
    GenericPlugin,
    /// A server runtime jar named `paper-<version>-<build>.jar`.
    ServerRuntime,
}

/// Structured identity extracted from a local artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDescriptor {
    pub source_path: PathBuf,
    pub display_name: String,
    /// Free-form version string as declared by the artifact.
    pub declared_version: String,
    #[serde(default)]
    pub homepage_url: Option<String>,
    pub kind: ArtifactKind,
    /// Platform version (server runtime only).
    #[serde(default)]
    pub runtime_platform_version: Option<String>,
    /// Build number (server runtime only).
    #[serde(default)]
    pub runtime_build_number: Option<u32>,
    /// Last pipeline stage, for display.
    pub status: String,
}

impl ArtifactDescriptor {
    /// A generic plugin descriptor.
    pub fn plugin(
        source_path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        declared_version: impl Into<String>,
        homepage_url: Option<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            display_name: display_name.into(),
            declared_version: declared_version.into(),
            homepage_url: homepage_url.filter(|url| !url.trim().is_empty()),
            kind: ArtifactKind::GenericPlugin,
            runtime_platform_version: None,
            runtime_build_number: None,
            status: "parsed".to_string(),
        }
    }

    /// File name of the artifact (`CoolPlugin-1.2.3.jar`).
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension (`CoolPlugin-1.2.3`).
    pub fn file_stem(&self) -> String {
        file_stem(&self.source_path)
    }

    pub fn is_runtime(&self) -> bool {
        self.kind == ArtifactKind::ServerRuntime
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
