//! portal-core: entry model, source loader, filter and renderer
//!
//! The loader resolves the entry list from ordered candidate sources with
//! fallback; [`PortalState`] owns the result and [`Renderer`] turns it into
//! the launcher page.

pub mod backoff;
pub mod config;
pub mod entry;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod loader;
pub mod render;
pub mod state;
pub mod store;
pub mod validation;

pub use backoff::{wait_until_ready, RetryPolicy};
pub use config::PortalConfig;
pub use entry::{AppEntry, AppsDocument};
pub use error::{PortalError, Result};
pub use fallback::{builtin_entries, FallbackPolicy};
pub use filter::filter;
pub use loader::{CandidateSource, HttpFetcher, Loader, Resolution, SourceFetcher, SourceTag};
pub use render::Renderer;
pub use state::PortalState;
pub use store::{DocumentStore, JsonFileStore, StoreError, StoredApp};
pub use validation::{validate_entry, ValidationError};
