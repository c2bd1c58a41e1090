//! Free-text field extractors and their fallbacks.

use std::sync::LazyLock;

use super::matcher::{first_keyword, KeywordRule, PatternChain, Rule};
use super::normalizer::{clean_phrase, format_interval, title_case};
use super::vitals::strip_vitals_fragments;
use crate::models::{MedicineTemplate, SuperTemplate};

pub const DEFAULT_CHIEF_COMPLAINT: &str = "Patient consultation";
pub const DEFAULT_CONSULT_SUMMARY: &str = "Clinical examination completed.";
pub const ADVICE_SENTENCE: &str = "Follow the prescribed treatment plan and take adequate rest.";
pub const DEFAULT_VISIT_TYPE: &str = "Not Specified";

static CHIEF_COMPLAINT: LazyLock<PatternChain> = LazyLock::new(|| {
    PatternChain::from_sources(&[
        r"came\s+with\s+complaints?\s+of\s+([^.]+)",
        r"presents\s+with\s+([^.]+)",
        r"complains?\s+of\s+([^.]+)",
        r"main\s+concern\s+is\s+([^.]+)",
        r"presented\s+with\s+([^.]+)",
        r"chief\s+complaint\s*(?:is|:)?\s*([^.]+)",
        r"\bc/o\b[:\s]*([^.]+)",
        r"patient\s+reports\s+([^.]+)",
        r"suffering\s+from\s+([^.]+)",
    ])
});

static EXAMINATION: LazyLock<PatternChain> = LazyLock::new(|| {
    PatternChain::from_sources(&[
        r"on\s+examination\b[\s:,-]*([^.]*)",
        r"examination\s+revealed\s+([^.]+)",
        r"findings\s+include\s+([^.]+)",
    ])
});

/// Fixed sentences appended to the summary when their trigger phrase is present.
const OBSERVATIONS: &[(&str, &str)] = &[
    ("appears anxious", "Patient appears anxious"),
    ("poor sleep", "Patient reports poor sleep"),
];

static FOLLOW_UP: LazyLock<PatternChain> = LazyLock::new(|| {
    let interval = r"(\d+)\s*(day|week|month)s?\b";
    PatternChain::new(
        [
            r"follow[\s-]*up\s+in\s+",
            r"next\s+visit\s+in\s+",
            r"review\s+in\s+",
            r"come\s+back\s+in\s+",
            r"return\s+after\s+",
        ]
        .iter()
        .map(|lead| Rule::joined(&format!("{lead}{interval}"), " "))
        .collect(),
    )
});

static MEDICINE_TEMPLATES: LazyLock<PatternChain> = LazyLock::new(|| {
    PatternChain::from_sources(&[
        r"\bmacros?\b\s*([^.]+)",
        r"\btemplates?\b\s*([^.]+)",
        r"\bprotocol\s*for\s*([^.]+)",
        r"\bmanagement\s*plan\s*for\s*([^.]+)",
        r"\bstandard\s*care\s*for\s*([^.]+)",
        r"\bfollow\s*guidelines\s*for\s*([^.]+)",
    ])
});

static SUPER_TEMPLATES: LazyLock<PatternChain> = LazyLock::new(|| {
    PatternChain::from_sources(&[
        r"\bsuper\s*macros?\b\s*([^.]+)",
        r"\bcomprehensive\s*protocol\s*([^.]+)",
        r"\badvanced\s*template\s*([^.]+)",
        r"\bcomplete\s*care\s*plan\s*([^.]+)",
        r"\bintegrated\s*management\s*([^.]+)",
        r"\bmaster\s*protocol\s*([^.]+)",
    ])
});

/// Template names shorter than this are noise ("of", "for").
const MIN_TEMPLATE_NAME_CHARS: usize = 4;

fn template_name(raw: String) -> Option<String> {
    let name = title_case(raw.trim());
    (name.chars().count() >= MIN_TEMPLATE_NAME_CHARS).then_some(name)
}

const ADVICE: &[KeywordRule] = &[KeywordRule {
    needles: &["advised", "recommend"],
    value: ADVICE_SENTENCE,
}];

const FOLLOW_UP_MODE: &[KeywordRule] = &[
    KeywordRule {
        needles: &["clinic visit"],
        value: "Clinic Visit",
    },
    KeywordRule {
        needles: &["teleconsultation"],
        value: "Teleconsultation",
    },
];

const VISIT_TYPE: &[KeywordRule] = &[
    KeywordRule {
        needles: &["clinic", "in person"],
        value: "In Person",
    },
    KeywordRule {
        needles: &["tele", "video"],
        value: "Tele",
    },
];

pub fn chief_complaint(text: &str) -> String {
    CHIEF_COMPLAINT
        .first_match_with(text, clean_phrase)
        .unwrap_or_else(|| DEFAULT_CHIEF_COMPLAINT.to_string())
}

pub fn consult_summary(text: &str, text_lower: &str) -> String {
    let mut parts: Vec<String> = EXAMINATION
        .first_match_with(text, |raw| clean_phrase(strip_vitals_fragments(&raw)))
        .into_iter()
        .collect();

    parts.extend(
        OBSERVATIONS
            .iter()
            .filter(|(trigger, _)| text_lower.contains(trigger))
            .map(|(_, sentence)| sentence.to_string()),
    );

    if parts.is_empty() {
        DEFAULT_CONSULT_SUMMARY.to_string()
    } else {
        format!("{}.", parts.join(". "))
    }
}

/// Every template reference, ids numbered from 1 in pattern order.
pub fn medicine_templates(text: &str) -> Vec<MedicineTemplate> {
    MEDICINE_TEMPLATES
        .all_matches_with(text, template_name)
        .into_iter()
        .enumerate()
        .map(|(i, name)| MedicineTemplate {
            name,
            id: (i + 1).to_string(),
        })
        .collect()
}

/// Every super-template reference, ids numbered from 1 in pattern order.
pub fn super_templates(text: &str) -> Vec<SuperTemplate> {
    SUPER_TEMPLATES
        .all_matches_with(text, template_name)
        .into_iter()
        .enumerate()
        .map(|(i, name)| SuperTemplate {
            name,
            id: (i + 1).to_string(),
        })
        .collect()
}

pub fn advice(text_lower: &str) -> String {
    first_keyword(ADVICE, text_lower)
        .unwrap_or_default()
        .to_string()
}

pub fn follow_up_day(text: &str) -> String {
    FOLLOW_UP
        .first_match_with(text, |joined| {
            let (count, unit) = joined.split_once(' ')?;
            Some(format_interval(count, unit))
        })
        .unwrap_or_default()
}

pub fn follow_up_mode(text_lower: &str) -> String {
    first_keyword(FOLLOW_UP_MODE, text_lower)
        .unwrap_or_default()
        .to_string()
}

pub fn visit_type(text_lower: &str) -> String {
    first_keyword(VISIT_TYPE, text_lower)
        .unwrap_or(DEFAULT_VISIT_TYPE)
        .to_string()
}
