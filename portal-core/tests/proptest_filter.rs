use portal_core::{filter, AppEntry};
use proptest::prelude::*;

// Strategy to generate entries with short mixed-case text
fn arb_entry() -> impl Strategy<Value = AppEntry> {
    ("[a-z]{1,8}", "[A-Za-z ]{0,16}", "[A-Za-z ]{0,24}").prop_map(|(id, name, description)| {
        AppEntry {
            url: format!("{id}/index.html"),
            image: format!("{id}.png"),
            id,
            name,
            description,
        }
    })
}

proptest! {
    /// Property: an empty term returns the list unchanged
    #[test]
    fn prop_empty_term_is_identity(entries in prop::collection::vec(arb_entry(), 0..30)) {
        let result = filter(&entries, "");
        prop_assert_eq!(result.len(), entries.len());
        for (got, want) in result.iter().zip(entries.iter()) {
            prop_assert_eq!(*got, want);
        }
    }

    /// Property: every hit contains the term in name or description
    #[test]
    fn prop_hits_contain_term(
        entries in prop::collection::vec(arb_entry(), 0..30),
        term in "[A-Za-z]{1,3}",
    ) {
        let needle = term.to_lowercase();
        for hit in filter(&entries, &term) {
            prop_assert!(
                hit.name.to_lowercase().contains(&needle)
                    || hit.description.to_lowercase().contains(&needle)
            );
        }
    }

    /// Property: nothing matching is dropped, and order follows the input
    #[test]
    fn prop_filter_is_complete_and_ordered(
        entries in prop::collection::vec(arb_entry(), 0..30),
        term in "[A-Za-z ]{1,3}",
    ) {
        let needle = term.to_lowercase();
        let expected: Vec<&AppEntry> = entries
            .iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&needle)
                    || e.description.to_lowercase().contains(&needle)
            })
            .collect();
        prop_assert_eq!(filter(&entries, &term), expected);
    }

    /// Property: case of the term never changes the result
    #[test]
    fn prop_case_insensitive(
        entries in prop::collection::vec(arb_entry(), 0..30),
        term in "[A-Za-z]{1,3}",
    ) {
        prop_assert_eq!(
            filter(&entries, &term.to_uppercase()),
            filter(&entries, &term.to_lowercase())
        );
    }

    /// Property: filtering leaves the source list untouched
    #[test]
    fn prop_filter_is_pure(
        entries in prop::collection::vec(arb_entry(), 0..30),
        term in ".{0,4}",
    ) {
        let before = entries.clone();
        let first = filter(&entries, &term).len();
        let second = filter(&entries, &term).len();
        prop_assert_eq!(first, second);
        prop_assert_eq!(entries, before);
    }
}
