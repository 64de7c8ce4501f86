//! Portal state owned by the composition root
//!
//! Holds the authoritative entry list. What is displayed is always derived
//! from (full list, search term); no filtered copy is stored.

use chrono::{DateTime, Utc};

use crate::entry::AppEntry;
use crate::filter::filter;
use crate::loader::{Resolution, SourceTag};

#[derive(Debug, Clone)]
pub struct PortalState {
    entries: Vec<AppEntry>,
    title: String,
    source: SourceTag,
    failed: bool,
    loaded_at: Option<DateTime<Utc>>,
}

impl PortalState {
    /// Empty state with the configured heading; nothing loaded yet.
    pub fn new(default_title: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            title: default_title.into(),
            source: SourceTag::None,
            failed: false,
            loaded_at: None,
        }
    }

    /// Replace the list with a fresh load result.
    ///
    /// A document title updates the heading; without one the heading stays.
    pub fn apply(&mut self, resolution: Resolution) {
        self.entries = resolution.entries;
        self.source = resolution.source;
        self.failed = resolution.failed;
        self.loaded_at = Some(Utc::now());

        if let Some(title) = resolution.title {
            self.title = title;
        }
    }

    pub fn entries(&self) -> &[AppEntry] {
        &self.entries
    }

    /// Entries to display for `term`, recomputed from the full list.
    pub fn visible(&self, term: &str) -> Vec<&AppEntry> {
        filter(&self.entries, term)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source(&self) -> SourceTag {
        self.source
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::builtin_entries;

    fn resolution(entries: Vec<AppEntry>, title: Option<&str>) -> Resolution {
        Resolution {
            entries,
            source: SourceTag::Local,
            failed: false,
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn apply_replaces_instead_of_merging() {
        let mut state = PortalState::new("Portal");
        state.apply(resolution(builtin_entries(), None));
        assert_eq!(state.entries().len(), 6);

        let one = vec![builtin_entries().remove(2)];
        state.apply(resolution(one.clone(), None));
        assert_eq!(state.entries(), one.as_slice());
        assert!(state.loaded_at().is_some());
    }

    #[test]
    fn title_only_changes_when_provided() {
        let mut state = PortalState::new("Portal");
        state.apply(resolution(Vec::new(), Some("Game Night")));
        assert_eq!(state.title(), "Game Night");

        state.apply(resolution(Vec::new(), None));
        assert_eq!(state.title(), "Game Night");
    }

    #[test]
    fn visible_is_derived_from_full_list() {
        let mut state = PortalState::new("Portal");
        state.apply(resolution(builtin_entries(), None));

        assert_eq!(state.visible("rpg").len(), 4);
        // Narrowing and widening again always starts from the full list
        assert_eq!(state.visible("knight").len(), 1);
        assert_eq!(state.visible("").len(), 6);
    }

    #[test]
    fn tracks_failure_flag() {
        let mut state = PortalState::new("Portal");
        assert_eq!(state.source(), SourceTag::None);
        state.apply(Resolution {
            entries: Vec::new(),
            source: SourceTag::None,
            failed: true,
            title: None,
        });
        assert!(state.failed());
    }
}
