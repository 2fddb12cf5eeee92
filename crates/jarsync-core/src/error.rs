//! Error types for Jarsync.
//!
//! Every failure the resolution pipeline can raise is a variant of
//! [`JarsyncError`]. Per-artifact and per-provider failures are folded into
//! the artifact's outcome message by the updater; only configuration errors
//! abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Maximum length of an error message surfaced in an outcome.
pub const SHORT_MESSAGE_MAX: usize = 120;

/// Main error type for the Jarsync library.
#[derive(Debug, Error)]
pub enum JarsyncError {
    // Local artifact errors
    #[error("Unrecognized artifact {path:?}: {message}")]
    MetadataParse { path: PathBuf, message: String },

    // Catalog errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Download errors
    #[error("Download failed for {url}: {message}")]
    DownloadFailed { url: String, message: String },

    #[error("Server redirected to a distribution page ({content_type}); automatic download is unsupported")]
    UnsupportedRedirect { url: String, content_type: String },

    #[error("Too many files named {file_name} in {dir:?}; cannot pick a destination")]
    NameSpaceExhausted { dir: PathBuf, file_name: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("cancelled")]
    Cancelled,
}

/// Result type alias for Jarsync operations.
pub type Result<T> = std::result::Result<T, JarsyncError>;

impl From<std::io::Error> for JarsyncError {
    fn from(err: std::io::Error) -> Self {
        JarsyncError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for JarsyncError {
    fn from(err: serde_json::Error) -> Self {
        JarsyncError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for JarsyncError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        JarsyncError::Network {
            message,
            cause: std::error::Error::source(&err).map(|s| s.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for JarsyncError {
    fn from(err: zip::result::ZipError) -> Self {
        JarsyncError::Io {
            message: format!("Failed to read archive: {}", err),
            path: None,
            source: None,
        }
    }
}

impl JarsyncError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        JarsyncError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a metadata parse error for an artifact.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        JarsyncError::MetadataParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from talking to a catalog.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, JarsyncError::Network { .. } | JarsyncError::Json { .. })
    }

    /// Whether the operation was aborted by a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, JarsyncError::Cancelled)
    }

    /// Display message truncated for aggregated failure summaries.
    pub fn short_message(&self) -> String {
        shorten(&self.to_string())
    }
}

/// Truncate a message to [`SHORT_MESSAGE_MAX`] characters, appending `...`.
pub fn shorten(message: &str) -> String {
    match message.char_indices().nth(SHORT_MESSAGE_MAX) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JarsyncError::DownloadFailed {
            url: "https://example.com/a.jar".into(),
            message: "status 404".into(),
        };
        assert_eq!(
            err.to_string(),
            "Download failed for https://example.com/a.jar: status 404"
        );
        assert_eq!(JarsyncError::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_provider_errors() {
        assert!(JarsyncError::Network {
            message: "refused".into(),
            cause: None
        }
        .is_provider_error());
        assert!(!JarsyncError::Cancelled.is_provider_error());
        assert!(JarsyncError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("short"), "short");

        let long = "x".repeat(200);
        let short = shorten(&long);
        assert_eq!(short.len(), SHORT_MESSAGE_MAX + 3);
        assert!(short.ends_with("..."));

        let exact = "y".repeat(SHORT_MESSAGE_MAX);
        assert_eq!(shorten(&exact), exact);
    }

    #[test]
    fn test_shorten_multibyte() {
        let long = "é".repeat(150);
        let short = shorten(&long);
        assert_eq!(short.chars().count(), SHORT_MESSAGE_MAX + 3);
    }
}
