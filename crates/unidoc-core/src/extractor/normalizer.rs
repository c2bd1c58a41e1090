//! Text normalization helpers shared by the field extractors.

use std::sync::LazyLock;

use regex::Regex;

use super::matcher::compile;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Clean a free-text capture: collapse whitespace and strip trailing `.`/`,`.
///
/// Returns `None` when nothing is left.
pub fn clean_phrase(raw: String) -> Option<String> {
    let collapsed = normalize_whitespace(&raw);
    let cleaned = collapsed
        .trim_end_matches(|c: char| c == '.' || c == ',' || c.is_whitespace())
        .trim_start_matches(|c: char| c == ',' || c == ':' || c.is_whitespace());
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Normalize a strength token such as "1000 MG" to "1000mg".
pub fn normalize_strength(raw: &str) -> String {
    raw.split_whitespace().collect::<String>().to_lowercase()
}

/// Format a follow-up interval, e.g. ("3", "weeks") → "3 Weeks", ("1", "day") → "1 Day".
pub fn format_interval(count: &str, unit: &str) -> String {
    let unit = unit.to_lowercase();
    let unit = unit.strip_suffix('s').unwrap_or(&unit);
    let plural = match count.parse::<u64>() {
        Ok(n) => n > 1,
        // Too large for u64 is certainly more than one.
        Err(_) => !count.is_empty(),
    };
    format!(
        "{} {}{}",
        count,
        capitalize(unit),
        if plural { "s" } else { "" }
    )
}

/// Uppercase the first character.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Title-case every word: first letter of each alphabetic run upper, rest lower.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
