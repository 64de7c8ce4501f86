//! App entries and the apps document wire format

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PortalError, Result};

/// One launchable sub-application, rendered as a single button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    pub id: String,
    pub name: String,
    /// Navigation target, relative path or absolute URL
    pub url: String,
    /// Icon filename under the asset base
    pub image: String,
    pub description: String,
}

impl AppEntry {
    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            id: self.id.trim().to_owned(),
            name: self.name.trim().to_owned(),
            url: self.url.trim().to_owned(),
            image: self.image.trim().to_owned(),
            description: self.description.trim().to_owned(),
        }
    }
}

/// `{ "apps": [...], "title": "..." }` as served by every candidate source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppsDocument {
    pub apps: Vec<AppEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl AppsDocument {
    pub fn new(apps: Vec<AppEntry>) -> Self {
        Self { apps, title: None }
    }

    /// Parse a response body, rejecting anything that is not the expected shape.
    ///
    /// Entries repeating an earlier `id` are dropped so the resulting list
    /// keeps ids unique in first-seen order.
    pub fn parse(body: &[u8], origin: &str) -> Result<Self> {
        let doc: Self = serde_json::from_slice(body)
            .map_err(|e| PortalError::malformed(origin, e.to_string()))?;

        Ok(doc.normalized(origin))
    }

    /// Drop entries repeating an earlier `id` (first one wins) and blank titles.
    pub fn normalized(mut self, origin: &str) -> Self {
        let mut seen = HashSet::with_capacity(self.apps.len());
        self.apps.retain(|app| {
            let fresh = seen.insert(app.id.clone());
            if !fresh {
                warn!(origin, id = %app.id, "dropping duplicate app id");
            }
            fresh
        });

        // Blank titles carry no heading
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            self.title = None;
        }

        self
    }
}
