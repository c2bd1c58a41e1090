//! Vital sign extraction (blood pressure, pulse rate, random blood sugar).

use std::sync::LazyLock;

use regex::Regex;

use super::matcher::{compile, PatternChain, Rule};
use crate::models::Vitals;

/// Optional linking word between a vitals label and its value.
const LINK: &str = r"\s*(?:is|was|of|:|-)?\s*";

static BP_CHAIN: LazyLock<PatternChain> = LazyLock::new(|| {
    PatternChain::new(vec![
        Rule::new(&format!(r"blood\s+pressure{LINK}(\d{{2,3}}/\d{{2,3}})\b")),
        Rule::new(&format!(r"\bBP{LINK}(\d{{2,3}}/\d{{2,3}})\b")),
        Rule::new(r"\b(\d{2,3}/\d{2,3})\s*mm\s*Hg"),
        Rule::new(r"\bwas\s+(\d{2,3}/\d{2,3})\b"),
        Rule::new(r"recorded\s+as\s+(\d{2,3}/\d{2,3})\b"),
        Rule::joined(
            r"systolic\D{0,20}?\b(\d{2,3})\b\D{0,20}?diastolic\D{0,20}?\b(\d{2,3})\b",
            "/",
        ),
    ])
});

static PR_CHAIN: LazyLock<PatternChain> = LazyLock::new(|| {
    PatternChain::new(vec![
        Rule::new(&format!(r"pulse\s+rate{LINK}(\d{{2,3}})\b")),
        Rule::new(&format!(r"\bPR{LINK}(\d{{2,3}})\b")),
        Rule::new(r"\b(\d{2,3})\s*bpm\b"),
        Rule::new(&format!(r"heart\s+rate{LINK}(\d{{2,3}})\b")),
        Rule::new(&format!(r"\bpulse{LINK}(\d{{2,3}})\b")),
        Rule::new(&format!(r"\bHR{LINK}(\d{{2,3}})\b")),
    ])
});

static RBS_CHAIN: LazyLock<PatternChain> = LazyLock::new(|| {
    PatternChain::new(vec![
        Rule::new(&format!(r"random\s+blood\s+sugar{LINK}(\d{{2,3}})\b")),
        Rule::new(&format!(r"\bRBS{LINK}(\d{{2,3}})\b")),
        Rule::new(&format!(r"blood\s+sugar{LINK}(\d{{2,3}})\b")),
        Rule::new(r"\b(\d{2,3})\s*mg\s*/\s*dL\b"),
        Rule::new(&format!(r"\bglucose(?:\s+level)?{LINK}(\d{{2,3}})\b")),
        Rule::new(&format!(r"\bsugar{LINK}(\d{{2,3}})\b")),
    ])
});

/// A vitals label up to and including the next comma.
static VITALS_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?:BP|PR|RBS)[^,]*,?"));

/// Extract all three vitals; each is empty when no pattern matches.
pub fn extract_vitals(text: &str) -> Vitals {
    Vitals {
        bp: BP_CHAIN.first_match(text).unwrap_or_default(),
        pr: PR_CHAIN.first_match(text).unwrap_or_default(),
        rbs: RBS_CHAIN.first_match(text).unwrap_or_default(),
    }
}

/// Remove embedded vitals fragments from a free-text finding.
pub fn strip_vitals_fragments(text: &str) -> String {
    VITALS_FRAGMENT.replace_all(text, "").into_owned()
}
