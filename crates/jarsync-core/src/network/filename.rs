//! Destination file naming for downloads.

use crate::config::{ArtifactConfig, DownloadConfig};
use crate::error::{JarsyncError, Result};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Characters rejected in file names on at least one major platform.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Extract the file name from a `Content-Disposition` header value.
///
/// `filename*=UTF-8''...` takes precedence over `filename=`; quotes are
/// stripped and percent-encoding decoded.
pub fn parse_content_disposition(header_value: &str) -> Option<String> {
    let mut plain = None;

    for param in header_value.split(';') {
        let Some((name, value)) = param.trim().split_once('=') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();

        if name == "filename*" {
            let encoded = value
                .split_once("''")
                .map(|(_, rest)| rest)
                .unwrap_or(value);
            if let Ok(decoded) = urlencoding::decode(encoded.trim_matches('"')) {
                if !decoded.trim().is_empty() {
                    return Some(decoded.into_owned());
                }
            }
        } else if name == "filename" {
            let unquoted = value.trim_matches('"').replace("\\\"", "\"");
            if !unquoted.trim().is_empty() {
                plain = Some(unquoted);
            }
        }
    }

    plain
}

/// Replace every character that is invalid in a file name with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_control() || INVALID_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Append the artifact extension unless already present (case-insensitive).
pub fn ensure_extension(name: &str) -> String {
    let suffix = format!(".{}", ArtifactConfig::EXTENSION);
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

/// Pick the download's file name: server header, then provider
/// suggestion, then `{artifact}-{version}.jar`. The result is sanitized and
/// carries the artifact extension.
pub fn choose_file_name(
    disposition: Option<&str>,
    suggested: Option<&str>,
    artifact_name: &str,
    version: &str,
) -> String {
    let raw = disposition
        .and_then(parse_content_disposition)
        .or_else(|| {
            suggested
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            format!("{}-{}.{}", artifact_name, version, ArtifactConfig::EXTENSION)
        });

    ensure_extension(&sanitize_file_name(raw.trim()))
}

/// Atomically create a file at the first free name in `dir`.
///
/// Tries `{dir}/{name}`, then `{stem} (1){ext}` through `{stem} (999){ext}`.
/// The file is created with `create_new`, so two concurrent downloads can
/// never claim the same path.
pub fn reserve_unique_path(dir: &Path, file_name: &str) -> Result<(PathBuf, File)> {
    let first = dir.join(file_name);
    if let Some(file) = try_create(&first)? {
        return Ok((first, file));
    }

    let (stem, ext) = split_extension(file_name);
    for i in 1..=DownloadConfig::MAX_NAME_PROBES {
        let candidate = dir.join(format!("{} ({}){}", stem, i, ext));
        if let Some(file) = try_create(&candidate)? {
            return Ok((candidate, file));
        }
    }

    Err(JarsyncError::NameSpaceExhausted {
        dir: dir.to_path_buf(),
        file_name: file_name.to_string(),
    })
}

fn try_create(path: &Path) -> Result<Option<File>> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(JarsyncError::io_with_path(e, path)),
    }
}

/// `plugin.jar` -> (`plugin`, `.jar`); names without a dot have no extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => file_name.split_at(pos),
        _ => (file_name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_content_disposition() {
        assert_eq!(
            parse_content_disposition("attachment; filename=\"LuckPerms-5.4.jar\"").as_deref(),
            Some("LuckPerms-5.4.jar")
        );
        assert_eq!(
            parse_content_disposition("attachment; filename=plain.jar").as_deref(),
            Some("plain.jar")
        );
        assert_eq!(
            parse_content_disposition(
                "attachment; filename=\"fallback.jar\"; filename*=UTF-8''caf%C3%A9%20v2.jar"
            )
            .as_deref(),
            Some("café v2.jar")
        );
        assert_eq!(parse_content_disposition("inline"), None);
        assert_eq!(parse_content_disposition("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a/b\\c:d*e?.jar"), "a_b_c_d_e_.jar");
        assert_eq!(sanitize_file_name("ok name-1.0.jar"), "ok name-1.0.jar");
        assert_eq!(sanitize_file_name("tab\there"), "tab_here");
    }

    #[test]
    fn test_ensure_extension() {
        assert_eq!(ensure_extension("plugin"), "plugin.jar");
        assert_eq!(ensure_extension("plugin.JAR"), "plugin.JAR");
        assert_eq!(ensure_extension("plugin.zip"), "plugin.zip.jar");
    }

    #[test]
    fn test_choose_file_name_priority() {
        assert_eq!(
            choose_file_name(
                Some("attachment; filename=\"Header.jar\""),
                Some("Suggested.jar"),
                "Art",
                "1.0"
            ),
            "Header.jar"
        );
        assert_eq!(
            choose_file_name(None, Some("Suggested"), "Art", "1.0"),
            "Suggested.jar"
        );
        assert_eq!(
            choose_file_name(Some("inline"), Some(" "), "My:Art", "2.0"),
            "My_Art-2.0.jar"
        );
    }

    #[test]
    fn test_reserve_unique_path_adds_suffixes() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();

        let (first, _) = reserve_unique_path(dir, "plugin.jar").unwrap();
        assert_eq!(first, dir.join("plugin.jar"));

        let (second, _) = reserve_unique_path(dir, "plugin.jar").unwrap();
        assert_eq!(second, dir.join("plugin (1).jar"));

        let (third, _) = reserve_unique_path(dir, "plugin.jar").unwrap();
        assert_eq!(third, dir.join("plugin (2).jar"));
    }

    #[test]
    fn test_reserve_unique_path_fills_gaps_in_order() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        std::fs::write(dir.join("plugin.jar"), b"").unwrap();
        std::fs::write(dir.join("plugin (2).jar"), b"").unwrap();

        let (path, _) = reserve_unique_path(dir, "plugin.jar").unwrap();
        assert_eq!(path, dir.join("plugin (1).jar"));
    }

    #[test]
    fn test_reserve_unique_path_exhausted() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        std::fs::write(dir.join("p.jar"), b"").unwrap();
        for i in 1..=999 {
            std::fs::write(dir.join(format!("p ({}).jar", i)), b"").unwrap();
        }

        let err = reserve_unique_path(dir, "p.jar").unwrap_err();
        assert!(matches!(err, JarsyncError::NameSpaceExhausted { .. }));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("plugin.jar"), ("plugin", ".jar"));
        assert_eq!(split_extension("a.b.jar"), ("a.b", ".jar"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }
}
