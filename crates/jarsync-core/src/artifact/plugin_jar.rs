//! `plugin.yml` extraction from plugin jars.
//!
//! Only flat, top-level `key: value` lines are read. Indented lines belong to
//! nested sections (commands, permissions) and are skipped.

use crate::config::ArtifactConfig;
use crate::error::{JarsyncError, Result};
use crate::models::{file_stem, ArtifactDescriptor};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read a plugin jar's embedded descriptor.
///
/// Falls back to the file stem for the name, `unknown` for the version and an
/// empty homepage. Fails when the archive has no `plugin.yml` at all.
pub fn read_plugin_jar(path: &Path) -> Result<ArtifactDescriptor> {
    let file = std::fs::File::open(path).map_err(|e| JarsyncError::io_with_path(e, path))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| JarsyncError::metadata(path, format!("not a readable jar archive: {}", e)))?;

    let entry_name = find_descriptor_entry(archive.file_names()).ok_or_else(|| {
        JarsyncError::metadata(
            path,
            format!(
                "{} not found; this may not be a Bukkit-family plugin jar",
                ArtifactConfig::DESCRIPTOR_FILE
            ),
        )
    })?;

    let unreadable = |reason: String| {
        JarsyncError::metadata(path, format!("cannot read {}: {}", entry_name, reason))
    };
    let mut raw = Vec::new();
    archive
        .by_name(&entry_name)
        .map_err(|e| unreadable(e.to_string()))?
        .read_to_end(&mut raw)
        .map_err(|e| unreadable(e.to_string()))?;
    let text = String::from_utf8_lossy(&raw);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let fields = parse_flat_yaml(text);
    debug!(
        "Read {} from {} ({} top-level keys)",
        entry_name,
        path.display(),
        fields.len()
    );

    let name = field_or(&fields, "name", &file_stem(path));
    let version = field_or(&fields, "version", ArtifactConfig::UNKNOWN_VERSION);
    let website = field_or(&fields, "website", "");

    Ok(ArtifactDescriptor::plugin(
        path,
        name,
        version,
        Some(website),
    ))
}

/// Locate `plugin.yml` at the root or at the end of any entry path.
fn find_descriptor_entry<'a>(names: impl Iterator<Item = &'a str>) -> Option<String> {
    let suffix = format!("/{}", ArtifactConfig::DESCRIPTOR_FILE);
    let mut nested = None;
    for name in names {
        let lower = name.to_ascii_lowercase();
        if lower == ArtifactConfig::DESCRIPTOR_FILE {
            return Some(name.to_string());
        }
        if nested.is_none() && lower.ends_with(&suffix) {
            nested = Some(name.to_string());
        }
    }
    nested
}

/// Parse top-level `key: value` pairs. Keys are compared case-insensitively.
pub(crate) fn parse_flat_yaml(text: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();

    for line in text.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        fields.insert(key.to_ascii_lowercase(), unquote(value.trim()).to_string());
    }

    fields
}

/// Strip one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    let value = value.trim();
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn field_or(fields: &HashMap<String, String>, key: &str, fallback: &str) -> String {
    match fields.get(key).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}
