use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// Distinct numeric literals of `text`, as written
pub fn extract_numbers(text: &str) -> BTreeSet<String> {
    NUMBER_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// |A∩B| / min(|A|, |B|) over distinct tokens
///
/// 0.0 when either side is empty.
pub fn token_overlap<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    let a: HashSet<&str> = a.iter().map(|t| t.as_ref()).collect();
    let b: HashSet<&str> = b.iter().map(|t| t.as_ref()).collect();
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / smaller as f64
}

/// Rule label for a numeric conflict, e.g. `30 vs 60`
pub fn conflict_label(a: &BTreeSet<String>, b: &BTreeSet<String>) -> String {
    let join = |s: &BTreeSet<String>| s.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    format!("{} vs {}", join(a), join(b))
}

/// Numbers of two texts disagree while their wording mostly agrees
///
/// Returns the rule label when the texts conflict.
pub fn numeric_conflict<S: AsRef<str>>(
    text_a: &str,
    tokens_a: &[S],
    text_b: &str,
    tokens_b: &[S],
    overlap_threshold: f64,
) -> Option<String> {
    let nums_a = extract_numbers(text_a);
    let nums_b = extract_numbers(text_b);
    if nums_a.is_empty() || nums_b.is_empty() || nums_a == nums_b {
        return None;
    }
    if token_overlap(tokens_a, tokens_b) > overlap_threshold {
        Some(conflict_label(&nums_a, &nums_b))
    } else {
        None
    }
}
