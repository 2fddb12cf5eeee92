//! The set of artifacts checked in one run.

use super::{has_artifact_extension, read_artifact};
use crate::config::ArtifactConfig;
use crate::error::shorten;
use crate::models::{file_stem, ArtifactDescriptor};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Counts from one [`WorkingSet::ingest`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub added: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

/// Descriptors for the artifacts of a run, in ingestion order.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    artifacts: Vec<ArtifactDescriptor>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add files, and the top-level jars of directories.
    ///
    /// Files that are missing or lack the jar extension are skipped. Paths
    /// already in the set are counted as duplicates. An artifact whose
    /// metadata cannot be read is still added with a fallback descriptor so
    /// that it receives an outcome.
    pub fn ingest<I, P>(&mut self, paths: I) -> IngestReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = IngestReport::default();

        for file in paths.into_iter().flat_map(|p| expand(p.as_ref())) {
            if !file.is_file() || !has_artifact_extension(&file) {
                report.skipped += 1;
                continue;
            }
            if self.contains(&file) {
                report.duplicates += 1;
                continue;
            }

            self.artifacts.push(describe(&file));
            report.added += 1;
        }

        debug!(
            "Ingested {} artifacts ({} duplicates, {} skipped)",
            report.added, report.duplicates, report.skipped
        );
        report
    }

    /// Whether a path is already in the set (case-insensitive).
    pub fn contains(&self, path: &Path) -> bool {
        self.artifacts
            .iter()
            .any(|a| same_path(&a.source_path, path))
    }

    /// Remove an artifact by path (case-insensitive). Returns whether
    /// anything was removed.
    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.artifacts.len();
        self.artifacts.retain(|a| !same_path(&a.source_path, path));
        self.artifacts.len() != before
    }

    pub fn clear(&mut self) {
        self.artifacts.clear();
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn artifacts(&self) -> &[ArtifactDescriptor] {
        &self.artifacts
    }

    pub fn artifacts_mut(&mut self) -> &mut [ArtifactDescriptor] {
        &mut self.artifacts
    }
}

impl FromIterator<ArtifactDescriptor> for WorkingSet {
    fn from_iter<T: IntoIterator<Item = ArtifactDescriptor>>(iter: T) -> Self {
        Self {
            artifacts: iter.into_iter().collect(),
        }
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

/// A directory expands to its top-level entries; anything else to itself.
fn expand(path: &Path) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| has_artifact_extension(p))
        .collect();
    files.sort();
    files
}

fn describe(file: &Path) -> ArtifactDescriptor {
    match read_artifact(file) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            warn!("Failed to read {}: {}", file.display(), e);
            let mut fallback = ArtifactDescriptor::plugin(
                file,
                file_stem(file),
                ArtifactConfig::UNKNOWN_VERSION,
                None,
            );
            fallback.status = format!("parse failed: {}", shorten(&e.to_string()));
            fallback
        }
    }
}
