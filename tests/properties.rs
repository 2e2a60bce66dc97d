use lexdfa::{escape, InputReader, RangeSet, Regex};
use proptest::prelude::*;

fn range_set() -> impl Strategy<Value = RangeSet> {
    prop::collection::vec((0u32..0x400, 1u32..64), 0..8).prop_map(|spans| {
        let mut set = RangeSet::new();
        for (from, width) in spans {
            set.add_range(from, from + width);
        }
        set
    })
}

proptest! {
    #[test]
    fn complement_is_an_involution(set in range_set()) {
        prop_assert_eq!(set.complement().complement(), set);
    }

    #[test]
    fn complement_partitions_the_domain(set in range_set(), cp in 0u32..0x500) {
        prop_assert_ne!(set.contains(cp), set.complement().contains(cp));
    }

    #[test]
    fn intervals_stay_normalized(set in range_set()) {
        for pair in set.intervals().windows(2) {
            prop_assert!(pair[0].1 < pair[1].0);
        }
    }

    #[test]
    fn escaped_literal_has_fixed_length(text in "[a-z0-9.*+?(){}\\[\\]|&$-]{1,12}") {
        let r = Regex::compile(&escape(&text)).unwrap();
        let chars = text.chars().count();
        prop_assert_eq!(r.min_length(), chars);
        prop_assert_eq!(r.max_length(), chars);
        prop_assert!(r.is_match(&text));
    }

    #[test]
    fn split_then_join_restores_text(text in "[a-c:]{0,24}") {
        let r = Regex::compile(":").unwrap();
        let fields = r.split(&text, -1);
        prop_assert_eq!(fields.join(":"), text);
    }

    #[test]
    fn stream_split_matches_text_split(text in "[a-c ]{0,24}") {
        let r = Regex::compile(" +").unwrap();
        let mut reader = InputReader::from_text(&text);
        let streamed = r.split_in(&mut reader, 0).unwrap();
        let direct: Vec<String> = r.split(&text, 0).into_iter().map(String::from).collect();
        prop_assert_eq!(streamed, direct);
    }
}
