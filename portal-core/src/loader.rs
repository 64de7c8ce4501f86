//! Multi-source entry loader
//!
//! Candidate sources are tried strictly in order, one at a time. The first
//! one that answers with a success status and a well-formed apps document
//! wins. Unreachable sources, error statuses, malformed bodies and a store
//! that never becomes ready all fall through to the next candidate; only
//! running out of candidates is reported, via the fallback policy.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::backoff::{wait_until_ready, RetryPolicy};
use crate::config::PortalConfig;
use crate::entry::{AppEntry, AppsDocument};
use crate::error::{PortalError, Result};
use crate::fallback::{builtin_entries, FallbackPolicy};
use crate::store::DocumentStore;

/// One ordered option the loader may query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Configuration-derived remote endpoint (e.g. a raw GitHub file)
    Remote(Url),
    /// The document store, behind a readiness wait
    Store,
    /// Local static resource
    Local(Url),
    /// Local static resource with a `v=<millis>` query appended at fetch time
    CacheBusted(Url),
}

impl CandidateSource {
    pub fn tag(&self) -> SourceTag {
        match self {
            Self::Remote(_) => SourceTag::Remote,
            Self::Store => SourceTag::Store,
            Self::Local(_) => SourceTag::Local,
            Self::CacheBusted(_) => SourceTag::CacheBusted,
        }
    }
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) | Self::Local(url) => write!(f, "{}", url),
            Self::CacheBusted(url) => write!(f, "{}?v=<timestamp>", url),
            Self::Store => write!(f, "document store"),
        }
    }
}

/// Which source produced the current entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Remote,
    Store,
    Local,
    CacheBusted,
    /// Built-in constant list
    Fallback,
    /// Nothing loaded
    None,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Remote => "remote",
            Self::Store => "store",
            Self::Local => "local",
            Self::CacheBusted => "cache_busted",
            Self::Fallback => "fallback",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Outcome of one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub entries: Vec<AppEntry>,
    pub source: SourceTag,
    /// Every source failed and the policy is `Empty`
    pub failed: bool,
    /// Display title carried by the winning document, if any
    pub title: Option<String>,
}

/// Fetches the raw body of a URL source.
///
/// Implementations return `Ok` only for a success status; anything else is
/// an error the loader treats as "try the next candidate".
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// reqwest-backed fetcher; `file://` URLs are read from disk.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PortalError::http("client", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| PortalError::invalid_source(url.as_str(), "not a local file path"))?;
            return match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(PortalError::path_not_found(path))
                }
                Err(e) => Err(e.into()),
            };
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PortalError::http(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::status(url.as_str(), status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortalError::http(url.as_str(), e))?;
        Ok(bytes.to_vec())
    }
}

/// Interpret a configured location as a URL.
///
/// http(s) and file URLs are taken as-is; anything else is a filesystem
/// path, resolved against `base_dir` when relative.
pub fn resolve_location(value: &str, base_dir: &Path) -> Result<Url> {
    if let Ok(url) = Url::parse(value) {
        match url.scheme() {
            "http" | "https" | "file" => return Ok(url),
            // Windows drive letters parse as one-letter schemes
            s if s.len() > 1 => {
                return Err(PortalError::invalid_source(value, "unsupported URL scheme"))
            }
            _ => {}
        }
    }

    let path = Path::new(value);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };

    Url::from_file_path(&absolute)
        .map_err(|_| PortalError::invalid_source(value, "cannot convert path to URL"))
}

/// Append the cache-defeating `v` parameter.
pub fn cache_busted(url: &Url, token: i64) -> Url {
    let mut busted = url.clone();
    busted.query_pairs_mut().append_pair("v", &token.to_string());
    busted
}

pub struct Loader {
    candidates: Vec<CandidateSource>,
    fetcher: Arc<dyn SourceFetcher>,
    store: Option<Arc<dyn DocumentStore>>,
    retry: RetryPolicy,
    fallback: FallbackPolicy,
}

impl Loader {
    pub fn new(candidates: Vec<CandidateSource>, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            candidates,
            fetcher,
            store: None,
            retry: RetryPolicy::default(),
            fallback: FallbackPolicy::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Build the candidate list from configuration.
    ///
    /// Order: remote (only when `github.repo` is set), store (only when
    /// enabled and a store is given), local, cache-busted local.
    pub fn from_config(
        config: &PortalConfig,
        store: Option<Arc<dyn DocumentStore>>,
    ) -> Result<Self> {
        let base_dir = std::env::current_dir()?;
        let mut candidates = Vec::new();

        if let Some(github) = config.github.as_ref().filter(|g| !g.repo.trim().is_empty()) {
            let url = Url::parse(&github.raw_url())
                .map_err(|e| PortalError::invalid_source(&github.repo, e.to_string()))?;
            candidates.push(CandidateSource::Remote(url));
        }

        let store = store.filter(|_| config.loader.use_store);
        if store.is_some() {
            candidates.push(CandidateSource::Store);
        }

        let local = resolve_location(&config.sources.local, &base_dir)?;
        candidates.push(CandidateSource::Local(local.clone()));
        if config.sources.cache_bust {
            candidates.push(CandidateSource::CacheBusted(local));
        }

        let fetcher = HttpFetcher::new(Duration::from_secs(config.loader.fetch_timeout_secs))?;

        let mut loader = Self::new(candidates, Arc::new(fetcher))
            .with_retry(config.loader.retry)
            .with_fallback(config.loader.fallback);
        loader.store = store;
        Ok(loader)
    }

    pub fn candidates(&self) -> &[CandidateSource] {
        &self.candidates
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Try each candidate in order; fall back once all have failed.
    pub async fn resolve_entries(&self) -> Resolution {
        for candidate in &self.candidates {
            debug!(source = %candidate, "trying source");
            match self.attempt(candidate).await {
                Ok(doc) => {
                    info!(
                        source = %candidate,
                        apps = doc.apps.len(),
                        "loaded apps"
                    );
                    return Resolution {
                        entries: doc.apps,
                        source: candidate.tag(),
                        failed: false,
                        title: doc.title,
                    };
                }
                Err(e) => {
                    warn!(source = %candidate, error = %e, "source failed, trying next");
                }
            }
        }

        self.exhausted()
    }

    fn exhausted(&self) -> Resolution {
        match self.fallback {
            FallbackPolicy::Builtin => {
                warn!("all sources failed, using built-in app list");
                Resolution {
                    entries: builtin_entries(),
                    source: SourceTag::Fallback,
                    failed: false,
                    title: None,
                }
            }
            FallbackPolicy::Empty => {
                warn!("all sources failed, no apps available");
                Resolution {
                    entries: Vec::new(),
                    source: SourceTag::None,
                    failed: true,
                    title: None,
                }
            }
        }
    }

    async fn attempt(&self, candidate: &CandidateSource) -> Result<AppsDocument> {
        match candidate {
            CandidateSource::Remote(url) | CandidateSource::Local(url) => {
                self.fetch_document(url).await
            }
            CandidateSource::CacheBusted(url) => {
                let token = chrono::Utc::now().timestamp_millis();
                self.fetch_document(&cache_busted(url, token)).await
            }
            CandidateSource::Store => {
                let store = self
                    .store
                    .as_ref()
                    .ok_or_else(|| PortalError::config("store source configured without a store"))?;

                wait_until_ready("document store", self.retry, || store.ready()).await?;
                Ok(store.document().await?)
            }
        }
    }

    async fn fetch_document(&self, url: &Url) -> Result<AppsDocument> {
        let body = self.fetcher.fetch(url).await?;
        AppsDocument::parse(&body, url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::entry::AppEntry;
    use crate::store::{JsonFileStore, StoreError, StoredApp};

    /// Scripted fetcher keyed by URL path, recording every request
    #[derive(Default)]
    struct ScriptedFetcher {
        responses: HashMap<String, std::result::Result<String, u16>>,
        requests: Mutex<Vec<Url>>,
    }

    impl ScriptedFetcher {
        fn ok(mut self, path: &str, body: &str) -> Self {
            self.responses.insert(path.to_string(), Ok(body.to_string()));
            self
        }

        fn status(mut self, path: &str, status: u16) -> Self {
            self.responses.insert(path.to_string(), Err(status));
            self
        }

        fn requested(&self) -> Vec<Url> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SourceFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
            self.requests.lock().unwrap().push(url.clone());
            match self.responses.get(url.path()) {
                Some(Ok(body)) => Ok(body.clone().into_bytes()),
                Some(Err(status)) => Err(PortalError::status(url.as_str(), *status)),
                None => Err(PortalError::path_not_found(url.path())),
            }
        }
    }

    fn doc(names: &[&str], title: Option<&str>) -> String {
        let apps: Vec<AppEntry> = names
            .iter()
            .map(|n| AppEntry {
                id: n.to_lowercase(),
                name: n.to_string(),
                url: format!("{n}/index.html"),
                image: format!("{n}.png"),
                description: format!("{n} tools"),
            })
            .collect();
        serde_json::to_string(&AppsDocument {
            apps,
            title: title.map(str::to_string),
        })
        .unwrap()
    }

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://portal.test{path}")).unwrap()
    }

    fn standard_candidates() -> Vec<CandidateSource> {
        vec![
            CandidateSource::Remote(url("/remote/apps.json")),
            CandidateSource::Local(url("/apps.json")),
            CandidateSource::CacheBusted(url("/apps.json")),
        ]
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .ok("/remote/apps.json", &doc(&["Remote"], Some("From GitHub")))
                .ok("/apps.json", &doc(&["Local"], None)),
        );
        let loader = Loader::new(standard_candidates(), fetcher.clone());

        let res = loader.resolve_entries().await;

        assert_eq!(res.source, SourceTag::Remote);
        assert!(!res.failed);
        assert_eq!(res.title.as_deref(), Some("From GitHub"));
        assert_eq!(res.entries[0].name, "Remote");
        assert_eq!(fetcher.requested(), vec![url("/remote/apps.json")]);
    }

    #[tokio::test]
    async fn error_status_falls_through_in_order() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .status("/remote/apps.json", 404)
                .ok("/apps.json", &doc(&["Local"], None)),
        );
        let loader = Loader::new(standard_candidates(), fetcher.clone());

        let res = loader.resolve_entries().await;

        assert_eq!(res.source, SourceTag::Local);
        assert!(res.title.is_none());
        assert_eq!(
            fetcher.requested(),
            vec![url("/remote/apps.json"), url("/apps.json")]
        );
    }

    #[tokio::test]
    async fn malformed_body_falls_through_to_cache_buster() {
        struct StaleThenFresh {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl SourceFetcher for StaleThenFresh {
            async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
                match self.calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Ok(b"<html>cached error page</html>".to_vec()),
                    _ => {
                        assert!(url.query().unwrap().starts_with("v="));
                        Ok(doc(&["Fresh"], None).into_bytes())
                    }
                }
            }
        }

        let loader = Loader::new(
            vec![
                CandidateSource::Local(url("/apps.json")),
                CandidateSource::CacheBusted(url("/apps.json")),
            ],
            Arc::new(StaleThenFresh {
                calls: AtomicUsize::new(0),
            }),
        );

        let res = loader.resolve_entries().await;
        assert_eq!(res.source, SourceTag::CacheBusted);
        assert_eq!(res.entries[0].name, "Fresh");
    }

    #[tokio::test]
    async fn exhaustion_uses_builtin_list() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let loader = Loader::new(standard_candidates(), fetcher.clone());

        let res = loader.resolve_entries().await;

        assert_eq!(res.source, SourceTag::Fallback);
        assert!(!res.failed);
        assert_eq!(res.entries, builtin_entries());
        assert_eq!(fetcher.requested().len(), 3);
    }

    #[tokio::test]
    async fn exhaustion_with_empty_policy_flags_failure() {
        let fetcher = Arc::new(ScriptedFetcher::default().status("/apps.json", 500));
        let loader = Loader::new(standard_candidates(), fetcher)
            .with_fallback(FallbackPolicy::Empty);

        let res = loader.resolve_entries().await;

        assert_eq!(res.source, SourceTag::None);
        assert!(res.failed);
        assert!(res.entries.is_empty());
    }

    #[tokio::test]
    async fn no_candidates_goes_straight_to_fallback() {
        let loader = Loader::new(Vec::new(), Arc::new(ScriptedFetcher::default()));
        assert_eq!(loader.resolve_entries().await.source, SourceTag::Fallback);
    }

    /// Store whose readiness flips after a number of readiness checks
    struct WarmingStore {
        inner: JsonFileStore,
        checks: AtomicUsize,
        ready_after: usize,
    }

    #[async_trait]
    impl DocumentStore for WarmingStore {
        async fn ready(&self) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst) + 1 >= self.ready_after
        }
        async fn list(&self) -> std::result::Result<Vec<StoredApp>, StoreError> {
            self.inner.list().await
        }
        async fn get(&self, id: &str) -> std::result::Result<StoredApp, StoreError> {
            self.inner.get(id).await
        }
        async fn create(
            &self,
            entry: AppEntry,
            actor: &str,
        ) -> std::result::Result<StoredApp, StoreError> {
            self.inner.create(entry, actor).await
        }
        async fn update(
            &self,
            id: &str,
            entry: AppEntry,
            actor: &str,
        ) -> std::result::Result<StoredApp, StoreError> {
            self.inner.update(id, entry, actor).await
        }
        async fn delete(&self, id: &str) -> std::result::Result<(), StoreError> {
            self.inner.delete(id).await
        }
    }

    async fn warming_store(dir: &tempfile::TempDir, ready_after: usize) -> Arc<WarmingStore> {
        let inner = JsonFileStore::new(dir.path().join("apps.json"));
        inner
            .create(
                AppEntry {
                    id: "stored".into(),
                    name: "Stored App".into(),
                    url: "stored/".into(),
                    image: "stored.png".into(),
                    description: "from the store".into(),
                },
                "admin",
            )
            .await
            .unwrap();
        Arc::new(WarmingStore {
            inner,
            checks: AtomicUsize::new(0),
            ready_after,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn store_ready_on_third_check_after_backoff() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = warming_store(&dir, 3).await;
        let fetcher = Arc::new(ScriptedFetcher::default().ok("/apps.json", &doc(&["Local"], None)));

        let loader = Loader::new(
            vec![CandidateSource::Store, CandidateSource::Local(url("/apps.json"))],
            fetcher.clone(),
        )
        .with_store(store.clone());

        let start = tokio::time::Instant::now();
        let res = loader.resolve_entries().await;
        let elapsed = start.elapsed();

        assert_eq!(res.source, SourceTag::Store);
        assert_eq!(res.entries[0].id, "stored");
        assert_eq!(store.checks.load(Ordering::SeqCst), 3);
        assert!(elapsed >= Duration::from_millis(900), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1000), "{elapsed:?}");
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn store_never_ready_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = warming_store(&dir, usize::MAX).await;

        let loader = Loader::new(vec![CandidateSource::Store], Arc::new(ScriptedFetcher::default()))
            .with_store(store.clone())
            .with_fallback(FallbackPolicy::Empty);

        let res = loader.resolve_entries().await;

        assert!(res.failed);
        assert_eq!(store.checks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn store_document_keeps_first_of_repeated_ids() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("apps.json");
        std::fs::write(
            &path,
            r#"{"apps": [
                {"id": "baa", "name": "Sheep", "url": "baa/", "image": "baa.png", "description": "first"},
                {"id": "moo", "name": "Cow", "url": "moo/", "image": "moo.png", "description": "cow"},
                {"id": "baa", "name": "Ram", "url": "ram/", "image": "ram.png", "description": "again"}
            ]}"#,
        )
        .unwrap();

        let loader = Loader::new(vec![CandidateSource::Store], Arc::new(ScriptedFetcher::default()))
            .with_store(Arc::new(JsonFileStore::new(&path)));
        let res = loader.resolve_entries().await;

        assert_eq!(res.source, SourceTag::Store);
        let names: Vec<_> = res.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Sheep", "Cow"]);
    }

    #[test]
    fn resolves_paths_and_urls() {
        let base = std::env::temp_dir();

        let http = resolve_location("https://example.com/apps.json", &base).unwrap();
        assert_eq!(http.scheme(), "https");

        let file = resolve_location("public/apps.json", &base).unwrap();
        assert_eq!(file.scheme(), "file");
        assert_eq!(file.to_file_path().unwrap(), base.join("public/apps.json"));

        assert!(resolve_location("ftp://example.com/apps.json", &base).is_err());
    }

    #[test]
    fn cache_buster_appends_query() {
        let busted = cache_busted(&url("/apps.json"), 1_700_000_000_000);
        assert_eq!(busted.as_str(), "https://portal.test/apps.json?v=1700000000000");
    }

    #[test]
    fn config_builds_ordered_candidates() {
        let mut config = PortalConfig::default();
        assert_eq!(
            Loader::from_config(&config, None)
                .unwrap()
                .candidates()
                .iter()
                .map(CandidateSource::tag)
                .collect::<Vec<_>>(),
            vec![SourceTag::Local, SourceTag::CacheBusted]
        );

        config.github = Some(crate::config::GithubConfig {
            repo: "someone/32gamers".into(),
            branch: "main".into(),
        });
        config.sources.cache_bust = false;
        config.loader.use_store = true;
        let store: Arc<dyn DocumentStore> =
            Arc::new(JsonFileStore::new(std::env::temp_dir().join("apps.json")));

        let loader = Loader::from_config(&config, Some(store)).unwrap();
        let tags: Vec<_> = loader.candidates().iter().map(CandidateSource::tag).collect();
        assert_eq!(tags, vec![SourceTag::Remote, SourceTag::Store, SourceTag::Local]);
        assert_eq!(
            loader.candidates()[0],
            CandidateSource::Remote(
                Url::parse("https://raw.githubusercontent.com/someone/32gamers/main/apps.json")
                    .unwrap()
            )
        );
    }
}
