//! Search query candidates for an artifact.

use crate::models::ArtifactDescriptor;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// An optional separator, optional `v`, numeric groups and whatever follows.
static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[-_ ]?v?\d+([._-]\d+)*.*$").unwrap());

/// Remove a trailing version-looking suffix from a file stem.
///
/// `CoolPlugin-1.2.3-SNAPSHOT` becomes `CoolPlugin`.
pub fn strip_version_suffix(stem: &str) -> String {
    VERSION_SUFFIX.replace(stem, "").into_owned()
}

/// Build the ordered, case-insensitively unique list of search strings:
/// declared name, file stem, and file stem without its version suffix.
pub fn query_candidates(descriptor: &ArtifactDescriptor) -> Vec<String> {
    let stem = descriptor.file_stem();
    let stripped = strip_version_suffix(&stem);

    let mut seen = HashSet::new();
    [descriptor.display_name.as_str(), stem.as_str(), stripped.as_str()]
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.to_lowercase()))
        .map(str::to_string)
        .collect()
}
