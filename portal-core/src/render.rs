//! HTML rendering of the launcher grid
//!
//! Each call rebuilds the whole container; there is no incremental diffing.
//! All interpolated text goes through [`html_escape`].

use crate::entry::AppEntry;
use crate::state::PortalState;

/// Shown inside the container when a search matches nothing
pub const NO_RESULTS_MESSAGE: &str = "No apps found matching your search.";

/// Shown inside the container when every source failed
pub const LOAD_ERROR_MESSAGE: &str =
    "Unable to load apps. Please check your internet connection or contact the administrator.";

/// Route serving [`Renderer::render_container`] alone; the page script
/// re-fetches it on every keystroke in the search box.
pub const CONTAINER_PATH: &str = "/partials/apps";

/// Icon used when an entry's image fails to load
pub const PLACEHOLDER_IMAGE: &str = "placeholder.png";

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[derive(Debug, Clone)]
pub struct Renderer {
    asset_base: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new("assets/images")
    }
}

impl Renderer {
    pub fn new(asset_base: impl Into<String>) -> Self {
        Self {
            asset_base: asset_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn asset(&self, file: &str) -> String {
        if self.asset_base.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", self.asset_base, file)
        }
    }

    /// One launcher button.
    pub fn render_button(&self, entry: &AppEntry, index: usize) -> String {
        let name = html_escape(&entry.name);
        let description = html_escape(&entry.description);

        format!(
            concat!(
                r#"<a href="{url}" class="button" data-app-id="{id}" "#,
                r#"style="animation-delay: {delay:.1}s" "#,
                r#"aria-label="{name} - {description}" title="{description}">"#,
                r#"<img src="{src}" alt="{name}" onerror="this.onerror=null;this.src='{placeholder}'"/>"#,
                r#"<span>{name}</span></a>"#,
            ),
            url = html_escape(&entry.url),
            id = html_escape(&entry.id),
            delay = (index + 1) as f64 * 0.1,
            name = name,
            description = description,
            src = html_escape(&self.asset(&entry.image)),
            placeholder = html_escape(&self.asset(PLACEHOLDER_IMAGE)),
        )
    }

    /// Container contents for `entries`, or the no-results marker when empty.
    pub fn render<'a, I>(&self, entries: I) -> String
    where
        I: IntoIterator<Item = &'a AppEntry>,
    {
        let mut html = String::new();
        for (index, entry) in entries.into_iter().enumerate() {
            html.push_str(&self.render_button(entry, index));
            html.push('\n');
        }

        if html.is_empty() {
            format!(r#"<p class="no-results">{}</p>"#, NO_RESULTS_MESSAGE)
        } else {
            html
        }
    }

    /// Error block with a retry control that reloads the page.
    pub fn render_error(&self, message: &str) -> String {
        format!(
            r#"<div class="error-message"><p>{}</p><button type="button" onclick="window.location.reload()">Retry</button></div>"#,
            html_escape(message)
        )
    }

    /// The button container for the current state and search term.
    pub fn render_container(&self, state: &PortalState, term: &str) -> String {
        let inner = if state.failed() {
            self.render_error(LOAD_ERROR_MESSAGE)
        } else {
            self.render(state.visible(term))
        };
        format!(r#"<div class="button-container">{}</div>"#, inner)
    }

    /// Complete portal document.
    pub fn render_page(&self, state: &PortalState, term: &str) -> String {
        let title = html_escape(state.title());

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/assets/styles.css">
</head>
<body>
<div class="container">
<h1>{title}</h1>
<form class="search-container" method="get" action="/" role="search">
<input type="search" name="q" class="search-input" placeholder="Search apps..." value="{term}" autocomplete="off">
</form>
{container}
<a id="adminIcon" class="admin-icon" href="/admin" aria-label="Admin">&#9881;</a>
</div>
<script>
document.addEventListener('keydown', function (e) {{
  if (e.ctrlKey && e.altKey && e.key === 'a') {{ e.preventDefault(); window.location.href = '/admin'; }}
  if (e.ctrlKey && e.key === 'f') {{ e.preventDefault(); document.querySelector('.search-input').focus(); }}
}});
(function () {{
  var search = document.querySelector('.search-input');
  var pending = null;
  search.addEventListener('input', function () {{
    var q = search.value;
    if (pending) pending.abort();
    pending = new AbortController();
    fetch('{partial}?q=' + encodeURIComponent(q), {{ signal: pending.signal }})
      .then(function (r) {{ return r.text(); }})
      .then(function (html) {{
        document.querySelector('.button-container').outerHTML = html;
        history.replaceState(null, '', q ? '/?q=' + encodeURIComponent(q) : '/');
      }})
      .catch(function () {{}});
  }});
}})();
</script>
</body>
</html>
"#,
            title = title,
            term = html_escape(term),
            container = self.render_container(state, term),
            partial = CONTAINER_PATH,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::builtin_entries;
    use crate::loader::{Resolution, SourceTag};

    fn state_with(entries: Vec<AppEntry>, failed: bool) -> PortalState {
        let mut state = PortalState::new("32Gamers Club");
        state.apply(Resolution {
            entries,
            source: if failed { SourceTag::None } else { SourceTag::Local },
            failed,
            title: None,
        });
        state
    }

    #[test]
    fn renders_one_button_per_entry_in_order() {
        let entries = builtin_entries();
        let html = Renderer::default().render(&entries);

        assert_eq!(html.matches(r#"class="button""#).count(), entries.len());

        let mut last = 0;
        for entry in &entries {
            let pos = html
                .find(&format!(r#"data-app-id="{}""#, entry.id))
                .expect("button present");
            assert!(pos >= last, "{} out of order", entry.id);
            last = pos;
        }
    }

    #[test]
    fn button_exposes_entry_fields() {
        let entry = &builtin_entries()[0];
        let html = Renderer::new("assets/images/").render_button(entry, 0);

        assert!(html.contains(r#"href="TravellerApp/index.html""#));
        assert!(html.contains("<span>Traveller App</span>"));
        assert!(html.contains(
            r#"aria-label="Traveller App - Character generator and game tools for Traveller RPG""#
        ));
        assert!(html.contains(r#"title="Character generator and game tools for Traveller RPG""#));
        assert!(html.contains(r#"src="assets/images/TravellerApp.png""#));
        assert!(html.contains("assets/images/placeholder.png"));
        assert!(html.contains("animation-delay: 0.1s"));
    }

    #[test]
    fn empty_list_renders_single_no_results_marker() {
        let html = Renderer::default().render(std::iter::empty());
        assert_eq!(html.matches("no-results").count(), 1);
        assert!(!html.contains(r#"class="button""#));
    }

    #[test]
    fn filtered_container_replaces_previous_list() {
        let state = state_with(builtin_entries(), false);
        let renderer = Renderer::default();

        let all = renderer.render_container(&state, "");
        assert_eq!(all.matches(r#"class="button""#).count(), 6);

        let none = renderer.render_container(&state, "zzz-no-such-app");
        assert_eq!(none.matches(r#"class="button""#).count(), 0);
        assert_eq!(none.matches("no-results").count(), 1);
    }

    #[test]
    fn failed_state_renders_retry() {
        let state = state_with(Vec::new(), true);
        let html = Renderer::default().render_container(&state, "");
        assert!(html.contains("error-message"));
        assert!(html.contains("window.location.reload()"));
        assert!(!html.contains("no-results"));
    }

    #[test]
    fn escapes_markup() {
        let entry = AppEntry {
            id: "x".into(),
            name: "<script>alert('x')</script>".into(),
            url: "x/".into(),
            image: "x.png".into(),
            description: "a \"quoted\" & thing".into(),
        };
        let html = Renderer::default().render_button(&entry, 0);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&quot;quoted&quot; &amp; thing"));
    }

    #[test]
    fn page_echoes_escaped_search_term_and_title() {
        let mut state = state_with(builtin_entries(), false);
        state.apply(Resolution {
            entries: builtin_entries(),
            source: SourceTag::Remote,
            failed: false,
            title: Some("Game Night".into()),
        });

        let html = Renderer::default().render_page(&state, "\"rpg\"");
        assert!(html.contains("<h1>Game Night</h1>"));
        assert!(html.contains(r#"value="&quot;rpg&quot;""#));
        assert!(html.contains(r#"href="/admin""#));
    }

    #[test]
    fn page_refilters_on_every_keystroke() {
        let state = state_with(builtin_entries(), false);
        let html = Renderer::default().render_page(&state, "");

        assert!(html.contains("addEventListener('input'"));
        assert!(html.contains("fetch('/partials/apps?q=' + encodeURIComponent(q)"));
        // The form still works without the script
        assert!(html.contains(r#"method="get" action="/""#));
    }
}
