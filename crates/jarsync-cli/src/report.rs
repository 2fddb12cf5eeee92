//! Plain-text rendering of progress events and outcomes.

use jarsync_core::{IngestReport, ProgressEvent, UpdateOutcome, UpdateStatus};

pub fn ingest_line(report: &IngestReport) -> String {
    format!(
        "added {} (duplicates {}, skipped {})",
        report.added, report.duplicates, report.skipped
    )
}

/// One stderr line per interesting event; provider attempts stay in the debug log.
pub fn progress_line(event: &ProgressEvent, names: &[String]) -> Option<String> {
    let total = names.len();
    let name_of = |index: usize| names.get(index).map(String::as_str).unwrap_or("?");

    match event {
        ProgressEvent::ArtifactStarted { index, name } => {
            Some(format!("[{}/{}] {}: checking for updates...", index + 1, total, name))
        }
        ProgressEvent::Downloading { index, url } => {
            Some(format!("[{}/{}] {}: downloading {}", index + 1, total, name_of(*index), url))
        }
        ProgressEvent::ArtifactFinished { index, outcome } => Some(format!(
            "[{}/{}] {}: {}",
            index + 1,
            total,
            name_of(*index),
            outcome.status
        )),
        ProgressEvent::Started { .. }
        | ProgressEvent::ProviderAttempt { .. }
        | ProgressEvent::Finished { .. } => None,
    }
}

pub fn outcome_line(outcome: &UpdateOutcome) -> String {
    let mut line = format!(
        "{:<7} {} {} -> {} [{}]",
        outcome.status.label(),
        outcome.artifact_name,
        outcome.previous_version,
        outcome.resolved_version,
        outcome.provider
    );
    if let (UpdateStatus::Updated, Some(path)) = (outcome.status, &outcome.saved_path) {
        line.push_str(&format!(" saved to {}", path.display()));
    }
    if !outcome.message.is_empty() {
        line.push_str(&format!(": {}", outcome.message));
    }
    line
}
