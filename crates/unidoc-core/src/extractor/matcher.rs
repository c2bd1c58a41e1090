//! Ordered, first-match-wins matcher chains.

use regex::Regex;

/// Compile a built-in pattern with case-insensitive matching.
///
/// # Panics
///
/// Panics if `source` is not a valid regex. Only used for static pattern tables,
/// all of which are exercised by the test suite.
pub(crate) fn compile(source: &str) -> Regex {
    Regex::new(&format!("(?i){}", source)).expect("built-in pattern must compile")
}

/// How a rule turns its capture groups into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The text of a single group.
    Group(usize),
    /// All groups from 1 onward, joined by the separator.
    Joined(&'static str),
}

/// A single pattern and its capture policy.
#[derive(Debug, Clone)]
pub struct Rule {
    regex: Regex,
    capture: Capture,
}

impl Rule {
    /// Rule whose value is capture group 1.
    pub fn new(source: &str) -> Self {
        Self {
            regex: compile(source),
            capture: Capture::Group(1),
        }
    }

    /// Rule whose value joins every capture group with `separator`.
    pub fn joined(source: &str, separator: &'static str) -> Self {
        Self {
            regex: compile(source),
            capture: Capture::Joined(separator),
        }
    }

    /// Value of the first occurrence of this rule in `text`.
    pub fn apply(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        self.value(&caps)
    }

    /// Values of every non-overlapping occurrence, left to right.
    pub fn apply_all(&self, text: &str) -> Vec<String> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| self.value(&caps))
            .collect()
    }

    fn value(&self, caps: &regex::Captures<'_>) -> Option<String> {
        match self.capture {
            Capture::Group(index) => caps.get(index).map(|m| m.as_str().to_string()),
            Capture::Joined(separator) => {
                let parts: Vec<&str> = caps
                    .iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.as_str()))
                    .collect::<Option<Vec<_>>>()?;
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(separator))
                }
            }
        }
    }
}

/// Rules tried in priority order; the first producing a value wins.
#[derive(Debug, Clone, Default)]
pub struct PatternChain {
    rules: Vec<Rule>,
}

impl PatternChain {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Chain of group-1 rules, one per source, in the given order.
    pub fn from_sources(sources: &[&str]) -> Self {
        Self::new(sources.iter().map(|s| Rule::new(s)).collect())
    }

    /// First rule value in priority order.
    pub fn first_match(&self, text: &str) -> Option<String> {
        self.first_match_with(text, Some)
    }

    /// First rule value accepted by `refine`.
    ///
    /// `refine` may clean a raw capture or reject it (`None`), in which case the
    /// next rule is tried.
    pub fn first_match_with<F>(&self, text: &str, refine: F) -> Option<String>
    where
        F: Fn(String) -> Option<String>,
    {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(text).and_then(&refine))
    }

    /// Every accepted value of every rule, grouped by rule in priority order.
    pub fn all_matches_with<F>(&self, text: &str, refine: F) -> Vec<String>
    where
        F: Fn(String) -> Option<String>,
    {
        self.rules
            .iter()
            .flat_map(|rule| rule.apply_all(text))
            .filter_map(&refine)
            .collect()
    }
}

/// Substring rule: any needle present yields `value`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub needles: &'static [&'static str],
    pub value: &'static str,
}

/// Value of the first rule with a needle in `text_lower`.
///
/// Needles are lowercase; `text_lower` must already be lowercased.
pub fn first_keyword(rules: &[KeywordRule], text_lower: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| text_lower.contains(needle)))
        .map(|rule| rule.value)
}
