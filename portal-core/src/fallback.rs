//! Built-in last-resort entry list

use serde::{Deserialize, Serialize};

use crate::entry::AppEntry;

/// What the loader does once every candidate source has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Serve the embedded constant list so the portal is never blank
    #[default]
    Builtin,
    /// Serve nothing and flag the failure so the page offers a retry
    Empty,
}

const BUILTIN: &[(&str, &str, &str, &str, &str)] = &[
    (
        "traveller",
        "Traveller App",
        "TravellerApp/index.html",
        "TravellerApp.png",
        "Character generator and game tools for Traveller RPG",
    ),
    (
        "mmrpg",
        "MMRPG App",
        "MMRPGApp/index.html",
        "MMRPG.png",
        "Tools and utilities for MMRPG campaigns",
    ),
    (
        "knight",
        "KnightRPG App",
        "KnightRPG/index.html",
        "knight_tarot.png",
        "Character tools for KnightRPG system",
    ),
    (
        "baa",
        "BAA Campaign",
        "BAA/index.html",
        "BAA.png",
        "Boston Avenger RPG Campaign resources",
    ),
    (
        "rogues",
        "The Rogues Gallery",
        "theRoguesGallery/index.html",
        "theRoguesGallery.png",
        "Character gallery and NPC resources",
    ),
    (
        "converter",
        "5e to Daggerheart Converter",
        "5eConverter/index.html",
        "5eConvert.png",
        "Convert D&D 5e content to Daggerheart system",
    ),
];

/// The embedded entry list.
pub fn builtin_entries() -> Vec<AppEntry> {
    BUILTIN
        .iter()
        .map(|&(id, name, url, image, description)| AppEntry {
            id: id.to_owned(),
            name: name.to_owned(),
            url: url.to_owned(),
            image: image.to_owned(),
            description: description.to_owned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_entry;
    use std::collections::HashSet;

    #[test]
    fn builtin_list_is_valid_and_unique() {
        let entries = builtin_entries();
        assert_eq!(entries.len(), 6);

        let ids: HashSet<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), entries.len());

        for entry in &entries {
            validate_entry(entry).unwrap();
        }
    }

    #[test]
    fn policy_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: FallbackPolicy,
        }
        let w: Wrapper = toml::from_str(r#"policy = "empty""#).unwrap();
        assert_eq!(w.policy, FallbackPolicy::Empty);
        assert_eq!(FallbackPolicy::default(), FallbackPolicy::Builtin);
    }
}
