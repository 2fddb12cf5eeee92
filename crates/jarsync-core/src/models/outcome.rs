//! Per-artifact report rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Final state of one artifact after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Updated,
    AlreadyLatest,
    Failed,
}

impl UpdateStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UpdateStatus::Updated => "updated",
            UpdateStatus::AlreadyLatest => "latest",
            UpdateStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub artifact_name: String,
    pub previous_version: String,
    pub resolved_version: String,
    pub provider: String,
    pub status: UpdateStatus,
    /// Set only when `status` is `Updated`.
    #[serde(default)]
    pub saved_path: Option<PathBuf>,
    pub message: String,
}

impl UpdateOutcome {
    /// A failed outcome with no resolved version or provider.
    pub fn failed(
        artifact_name: impl Into<String>,
        previous_version: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            artifact_name: artifact_name.into(),
            previous_version: previous_version.into(),
            resolved_version: "-".to_string(),
            provider: "-".to_string(),
            status: UpdateStatus::Failed,
            saved_path: None,
            message: message.into(),
        }
    }
}

/// Counts per status for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub updated: usize,
    pub already_latest: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[UpdateOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            match outcome.status {
                UpdateStatus::Updated => summary.updated += 1,
                UpdateStatus::AlreadyLatest => summary.already_latest += 1,
                UpdateStatus::Failed => summary.failed += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.updated + self.already_latest + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "done: updated {} / latest {} / failed {}",
            self.updated, self.already_latest, self.failed
        )
    }
}
