//! Property tests for the update gate default.

use proptest::prelude::*;

use rollout::domain::value_objects::{CheckResult, DiagnosticReport};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: the gate defaults to yes exactly when no check raised a
    /// violation, whatever informational findings were recorded.
    #[test]
    fn property_default_answer_tracks_violations(
        findings in proptest::collection::vec("[a-z-]{1,12}", 0..=6),
        violations in proptest::collection::vec("[a-z ]{1,20}", 0..=3),
    ) {
        let mut report = DiagnosticReport::new();
        for name in &findings {
            report.insert(name.as_str(), CheckResult::new("found", ""));
        }
        for reason in &violations {
            report.add_violation(reason.as_str());
        }
        prop_assert_eq!(report.default_answer(), violations.is_empty());
        prop_assert_eq!(report.default_answer(), report.ok());
    }
}
