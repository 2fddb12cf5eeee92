//! Fuzzy name scoring between an artifact and catalog entries.

use crate::config::MatchConfig;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").unwrap());

/// Lower-case and drop everything that is not a letter or digit.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn tokens(input: &str) -> HashSet<String> {
    TOKEN
        .find_iter(&input.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Score the best of `candidates` against `target`.
///
/// Within one candidate the bonuses stack: exact match, prefix in either
/// direction, substring in either direction, and a per-token bonus for
/// shared alphanumeric tokens. Only the best candidate counts. An empty
/// target scores 0.
pub fn score(target: &str, candidates: &[&str]) -> u32 {
    let normalized_target = normalize(target);
    if normalized_target.is_empty() {
        return 0;
    }
    let target_tokens = tokens(target);

    candidates
        .iter()
        .filter_map(|candidate| {
            let normalized = normalize(candidate);
            if normalized.is_empty() {
                return None;
            }

            let mut total = 0;
            if normalized == normalized_target {
                total += MatchConfig::EXACT_BONUS;
            }
            if normalized.starts_with(&normalized_target)
                || normalized_target.starts_with(&normalized)
            {
                total += MatchConfig::PREFIX_BONUS;
            }
            if normalized.contains(&normalized_target) || normalized_target.contains(&normalized) {
                total += MatchConfig::SUBSTRING_BONUS;
            }

            let shared = tokens(candidate).intersection(&target_tokens).count() as u32;
            total += shared * MatchConfig::TOKEN_BONUS;

            Some(total)
        })
        .max()
        .unwrap_or(0)
}
