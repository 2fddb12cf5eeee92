//! Version label comparison.
//!
//! Versions are free-form strings; the only comparison is equality after
//! light normalisation. No ordering is ever inferred.

/// Strip surrounding whitespace and quotes, then one leading `v`/`V` when
/// something follows it.
pub fn normalize_version(version: &str) -> &str {
    let trimmed = version.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'');
    match trimmed.strip_prefix(['v', 'V']) {
        Some(rest) if !rest.is_empty() => rest,
        _ => trimmed,
    }
}

/// Whether two version labels name the same release (case-insensitive).
///
/// An empty label on either side never matches.
pub fn is_same_version(current: &str, latest: &str) -> bool {
    let current = normalize_version(current);
    let latest = normalize_version(latest);
    if current.trim().is_empty() || latest.trim().is_empty() {
        return false;
    }
    current.to_lowercase() == latest.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("  v1.2.0 "), "1.2.0");
        assert_eq!(normalize_version("\"V2.0\""), "2.0");
        assert_eq!(normalize_version("'1.0'"), "1.0");
        assert_eq!(normalize_version("v"), "v");
        assert_eq!(normalize_version("version"), "ersion");
    }

    #[test]
    fn test_is_same_version() {
        assert!(is_same_version("1.2.0", "v1.2.0"));
        assert!(is_same_version("1.2.0-SNAPSHOT", "1.2.0-snapshot"));
        assert!(is_same_version("1.21.4-232", "1.21.4-232"));
        assert!(!is_same_version("1.2.0", "1.2.1"));
        assert!(!is_same_version("", "1.0"));
        assert!(!is_same_version("1.0", "  "));
        assert!(!is_same_version("\"\"", "\"\""));
    }
}
