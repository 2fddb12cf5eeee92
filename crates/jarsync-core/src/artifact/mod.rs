//! Local artifact inspection.
//!
//! Turns a jar on disk into an [`ArtifactDescriptor`]:
//! - [`plugin_jar`] reads the embedded `plugin.yml` of a plugin jar
//! - [`server_jar`] parses `paper-<version>-<build>.jar` file names
//! - [`working_set`] collects descriptors for one run

mod plugin_jar;
mod server_jar;
mod working_set;

pub use plugin_jar::read_plugin_jar;
pub use server_jar::{is_runtime_jar, read_server_jar};
pub use working_set::{IngestReport, WorkingSet};

pub(crate) use server_jar::PLATFORM_VERSION_PATTERN;

use crate::config::ArtifactConfig;
use crate::error::Result;
use crate::models::ArtifactDescriptor;
use std::path::Path;

/// Inspect an artifact, choosing the extractor from its file name.
pub fn read_artifact(path: &Path) -> Result<ArtifactDescriptor> {
    if is_runtime_jar(path) {
        read_server_jar(path)
    } else {
        read_plugin_jar(path)
    }
}

/// Whether a path carries the artifact extension (case-insensitive).
pub fn has_artifact_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ArtifactConfig::EXTENSION))
}

#[cfg(test)]
pub(crate) use plugin_jar::tests::write_jar;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArtifactKind;
    use tempfile::TempDir;

    #[test]
    fn test_read_artifact_dispatch() {
        let temp = TempDir::new().unwrap();
        let runtime = temp.path().join("paper-1.21.4-100.jar");
        std::fs::write(&runtime, b"not inspected").unwrap();
        assert_eq!(
            read_artifact(&runtime).unwrap().kind,
            ArtifactKind::ServerRuntime
        );

        let plugin = temp.path().join("Cool.jar");
        write_jar(&plugin, &[("plugin.yml", "name: Cool\nversion: 1\n")]);
        assert_eq!(read_artifact(&plugin).unwrap().kind, ArtifactKind::GenericPlugin);
    }

    #[test]
    fn test_has_artifact_extension() {
        assert!(has_artifact_extension(Path::new("a.jar")));
        assert!(has_artifact_extension(Path::new("A.JAR")));
        assert!(!has_artifact_extension(Path::new("a.zip")));
        assert!(!has_artifact_extension(Path::new("jar")));
    }
}
