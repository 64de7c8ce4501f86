use crate::entry::AppEntry;

/// Entries whose name or description contains `term`, case-insensitively.
///
/// An empty term returns every entry. Any other term, whitespace included,
/// must appear as a substring. Order is preserved and the input is never
/// modified, so filtering the same base list twice always agrees.
pub fn filter<'a>(entries: &'a [AppEntry], term: &str) -> Vec<&'a AppEntry> {
    if term.is_empty() {
        return entries.iter().collect();
    }

    let needle = term.to_lowercase();

    entries
        .iter()
        .filter(|entry| matches(entry, &needle))
        .collect()
}

fn matches(entry: &AppEntry, needle: &str) -> bool {
    entry.name.to_lowercase().contains(needle)
        || entry.description.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, description: &str) -> AppEntry {
        AppEntry {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.into(),
            url: "x/".into(),
            image: "x.png".into(),
            description: description.into(),
        }
    }

    fn sample() -> Vec<AppEntry> {
        vec![
            entry("Traveller App", "Character generator"),
            entry("KnightRPG", "tools"),
        ]
    }

    #[test]
    fn matches_description_case_insensitively() {
        let entries = sample();
        let hits = filter(&entries, "character");
        assert_eq!(hits, vec![&entries[0]]);
    }

    #[test]
    fn matches_name() {
        let entries = sample();
        assert_eq!(filter(&entries, "KNIGHT"), vec![&entries[1]]);
    }

    #[test]
    fn empty_term_returns_everything_in_order() {
        let entries = sample();
        assert_eq!(filter(&entries, ""), entries.iter().collect::<Vec<_>>());
    }

    #[test]
    fn whitespace_term_is_a_substring_match() {
        let entries = sample();
        assert_eq!(filter(&entries, " "), vec![&entries[0]]);
        assert!(filter(&entries, "   ").is_empty());
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter(&sample(), "daggerheart").is_empty());
    }
}
