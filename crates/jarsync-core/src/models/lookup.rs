//! Result of one provider's attempt to resolve an artifact.

use serde::{Deserialize, Serialize};

/// What a catalog knows about the latest build of an artifact.
///
/// A result without a download URL means the project was found but cannot be
/// fetched automatically; `note` explains why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub provider_name: String,
    pub project_display_name: String,
    pub latest_version_label: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub suggested_file_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl LookupResult {
    /// A result that can be downloaded.
    pub fn downloadable(
        provider_name: impl Into<String>,
        project_display_name: impl Into<String>,
        latest_version_label: impl Into<String>,
        download_url: impl Into<String>,
        suggested_file_name: Option<String>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            project_display_name: project_display_name.into(),
            latest_version_label: latest_version_label.into(),
            download_url: Some(download_url.into()),
            suggested_file_name,
            note: None,
        }
    }

    /// A result that was found but cannot be downloaded automatically.
    pub fn unavailable(
        provider_name: impl Into<String>,
        project_display_name: impl Into<String>,
        latest_version_label: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            project_display_name: project_display_name.into(),
            latest_version_label: latest_version_label.into(),
            download_url: None,
            suggested_file_name: None,
            note: Some(note.into()),
        }
    }

    /// Attach an informational note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn can_download(&self) -> bool {
        self.download_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
