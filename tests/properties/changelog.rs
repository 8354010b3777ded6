//! Property tests for changelog duplicate detection.

use proptest::prelude::*;

use rollout::domain::services::changelog::{duplicates, DUPLICATE_MIN_LEN, POST_MARKER};

fn entry() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[+ -][A-Za-z0-9 .\\[\\]]{0,30}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every reported duplicate really occurs twice, is long enough
    /// and carries no post marker; each is reported once, in sorted order.
    #[test]
    fn property_duplicates_are_sound(lines in proptest::collection::vec(entry(), 0..=20)) {
        let diff = lines.join("\n");
        let dups = duplicates(&diff);

        for dup in &dups {
            prop_assert!(diff.lines().filter(|l| *l == dup.as_str()).count() >= 2);
            prop_assert!(dup.chars().count() > DUPLICATE_MIN_LEN);
            prop_assert!(!dup.contains(POST_MARKER));
        }
        let mut sorted = dups.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted, dups);
    }

    /// PROPERTY: a long line written twice is always caught.
    #[test]
    fn property_repeated_long_line_is_found(
        body in "[a-z]{11,30}",
        noise in proptest::collection::vec(entry(), 0..=10),
    ) {
        let line = format!("+- {body}");
        let mut lines = noise;
        lines.push(line.clone());
        lines.insert(0, line.clone());
        let dups = duplicates(&lines.join("\n"));
        prop_assert!(dups.contains(&line));
    }
}
