//! Property tests for extraction.

use proptest::prelude::*;
use unidoc_core::extract;
use unidoc_core::extractor::{DEFAULT_CHIEF_COMPLAINT, DEFAULT_CONSULT_SUMMARY, DEFAULT_VISIT_TYPE};

proptest! {
    #[test]
    fn pattern_free_text_yields_defaults(text in "[xyz0-9 ,]{0,80}") {
        let record = extract(&text);
        prop_assert_eq!(record.chief_complaint, DEFAULT_CHIEF_COMPLAINT);
        prop_assert_eq!(record.consult_summary, DEFAULT_CONSULT_SUMMARY);
        prop_assert_eq!(record.visit_type, DEFAULT_VISIT_TYPE);
        prop_assert!(record.vitals.is_empty());
        prop_assert!(record.medications.is_empty());
        prop_assert!(record.investigations.is_empty());
        prop_assert!(record.medicine_templates.is_empty());
        prop_assert!(record.super_templates.is_empty());
        prop_assert_eq!(record.advice, "");
        prop_assert_eq!(record.follow_up_day, "");
        prop_assert_eq!(record.follow_up_mode, "");
    }

    #[test]
    fn extraction_is_idempotent(text in "\\PC{0,200}") {
        prop_assert_eq!(extract(&text), extract(&text));
    }

    #[test]
    fn fallbacks_are_never_empty(text in "\\PC{0,200}") {
        let record = extract(&text);
        prop_assert!(!record.chief_complaint.is_empty());
        prop_assert!(!record.consult_summary.is_empty());
        prop_assert!(!record.visit_type.is_empty());
    }

    #[test]
    fn follow_up_counts_round_trip(count in 1u32..500, unit in prop::sample::select(vec!["day", "week", "month"])) {
        let record = extract(&format!("Follow up in {count} {unit}s."));
        let plural = if count > 1 { "s" } else { "" };
        let mut expected_unit = unit.to_string();
        expected_unit[..1].make_ascii_uppercase();
        prop_assert_eq!(record.follow_up_day, format!("{count} {expected_unit}{plural}"));
    }
}
