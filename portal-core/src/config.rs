use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::backoff::RetryPolicy;
use crate::fallback::FallbackPolicy;

/// Default page heading when no source supplies a title
pub const DEFAULT_TITLE: &str = "32Gamers Club";

/// Centralized configuration for the portal
///
/// Every section is optional; a missing config file yields the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub portal: PageConfig,
    /// Remote repository coordinate for the first candidate source
    pub github: Option<GithubConfig>,
    pub sources: SourcesConfig,
    pub loader: LoaderConfig,
    pub store: StoreConfig,
    pub server: ServerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub title: String,
    /// URL prefix prepended to icon filenames
    pub asset_base: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            asset_base: "assets/images".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// `owner/name`
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl GithubConfig {
    /// Raw-content URL of the apps document in this repository
    pub fn raw_url(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/apps.json",
            self.repo.trim_matches('/'),
            self.branch
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Local static resource: http(s) URL or filesystem path
    pub local: String,
    /// Also try the local resource with a cache-defeating query parameter
    pub cache_bust: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            local: "public/apps.json".to_string(),
            cache_bust: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub fallback: FallbackPolicy,
    /// Per-request timeout for URL sources
    pub fetch_timeout_secs: u64,
    /// Query the document store (after the remote source, before local files)
    pub use_store: bool,
    pub retry: RetryPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::default(),
            fetch_timeout_secs: 10,
            use_store: false,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON document backing the admin CRUD surface
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("public/apps.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    /// Directory served for icons and other static assets
    pub static_dir: PathBuf,
    pub cors_permissive: bool,
    /// Bearer token for admin writes; writes are disabled when unset
    pub admin_token: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            static_dir: PathBuf::from("public"),
            cors_permissive: false,
            admin_token: None,
        }
    }
}

impl PortalConfig {
    /// Load config from `path`, or from ~/.portal/config.toml when `None`.
    ///
    /// An explicit path must exist. A missing default file means defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::read(&default_path)?
                } else {
                    tracing::debug!(path = ?default_path, "no config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();
        config.expand_variables();
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Config not found at {:?}\n\nRun: portal config init", path);
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&content).context("Failed to parse config file (invalid TOML)")
    }

    /// Get config file path: ~/.portal/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".portal/config.toml")
    }

    /// PORTAL_GITHUB_REPO and PORTAL_ADMIN_TOKEN take precedence over the file
    fn apply_env_overrides(&mut self) {
        if let Ok(repo) = env::var("PORTAL_GITHUB_REPO") {
            if repo.trim().is_empty() {
                self.github = None;
            } else {
                let branch = self
                    .github
                    .as_ref()
                    .map(|g| g.branch.clone())
                    .unwrap_or_else(default_branch);
                self.github = Some(GithubConfig { repo, branch });
            }
        }

        if let Ok(token) = env::var("PORTAL_ADMIN_TOKEN") {
            self.server.admin_token = Some(token);
        }
    }

    /// Expand ${var} references in secrets and paths
    fn expand_variables(&mut self) {
        let mut vars = HashMap::new();
        vars.insert("HOME".to_string(), env::var("HOME").unwrap_or_default());
        vars.insert(
            "PORTAL_ADMIN_TOKEN".to_string(),
            env::var("PORTAL_ADMIN_TOKEN").unwrap_or_default(),
        );

        if let Some(ref token) = self.server.admin_token {
            let expanded = Self::expand_string(token, &vars);
            // An unresolved or empty token disables admin writes
            self.server.admin_token = Some(expanded).filter(|t| !t.trim().is_empty());
        }

        self.sources.local = Self::expand_string(&self.sources.local, &vars);
        self.store.path = Self::expand_path(&self.store.path, &vars);
        self.server.static_dir = Self::expand_path(&self.server.static_dir, &vars);
    }

    fn expand_path(path: &Path, vars: &HashMap<String, String>) -> PathBuf {
        PathBuf::from(Self::expand_string(&path.display().to_string(), vars))
    }

    /// Expand ${var} references in a string
    fn expand_string(s: &str, vars: &HashMap<String, String>) -> String {
        let mut result = s.to_string();

        for (key, value) in vars {
            let pattern = format!("${{{}}}", key);
            result = result.replace(&pattern, value);
        }

        result
    }

    /// Warnings for settings that are legal but probably unintended
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref github) = self.github {
            if github.repo.split('/').filter(|p| !p.is_empty()).count() != 2 {
                warnings.push(format!(
                    "github.repo '{}' should look like owner/name",
                    github.repo
                ));
            }
        }

        if self.loader.retry.max_attempts == 0 && self.loader.use_store {
            warnings.push("loader.retry.max_attempts = 0 never queries the store".to_string());
        }

        if self.server.admin_token.is_none() {
            warnings.push("server.admin_token unset: admin writes are disabled".to_string());
        }

        warnings
    }

    /// Save config to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(path, toml_str)
            .context(format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_empty() {
        let config: PortalConfig = toml::from_str("").unwrap();
        assert_eq!(config.portal.title, DEFAULT_TITLE);
        assert!(config.github.is_none());
        assert_eq!(config.sources.local, "public/apps.json");
        assert!(config.sources.cache_bust);
        assert_eq!(config.loader.fallback, FallbackPolicy::Builtin);
        assert_eq!(config.loader.retry.base_backoff_ms, 300);
        assert_eq!(config.server.bind.port(), 3030);
    }

    #[test]
    fn parses_full_file() {
        let config: PortalConfig = toml::from_str(
            r#"
            [portal]
            title = "Game Night"

            [github]
            repo = "someone/32gamers"

            [sources]
            local = "http://127.0.0.1:8000/apps.json"
            cache_bust = false

            [loader]
            fallback = "empty"
            fetch_timeout_secs = 3
            use_store = true

            [loader.retry]
            max_attempts = 2
            base_backoff_ms = 50

            [server]
            bind = "0.0.0.0:8080"
            admin_token = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.portal.title, "Game Night");
        assert_eq!(config.portal.asset_base, "assets/images");
        let github = config.github.unwrap();
        assert_eq!(github.branch, "main");
        assert_eq!(
            github.raw_url(),
            "https://raw.githubusercontent.com/someone/32gamers/main/apps.json"
        );
        assert!(!config.sources.cache_bust);
        assert_eq!(config.loader.fallback, FallbackPolicy::Empty);
        assert_eq!(config.loader.retry.max_attempts, 2);
        assert_eq!(config.server.admin_token.as_deref(), Some("secret"));
    }

    #[test]
    fn explicit_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let err = PortalConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("portal config init"));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = PortalConfig::default();
        config.portal.title = "Saved".to_string();
        config.save(&path).unwrap();

        let loaded = PortalConfig::read(&path).unwrap();
        assert_eq!(loaded.portal.title, "Saved");
    }

    #[test]
    fn expand_string_replaces_known_vars() {
        let mut vars = HashMap::new();
        vars.insert("HOME".to_string(), "/home/gm".to_string());
        assert_eq!(
            PortalConfig::expand_string("${HOME}/apps.json", &vars),
            "/home/gm/apps.json"
        );
        assert_eq!(PortalConfig::expand_string("${OTHER}", &vars), "${OTHER}");
    }

    #[test]
    fn warns_on_odd_repo() {
        let mut config = PortalConfig::default();
        config.github = Some(GithubConfig {
            repo: "just-a-name".to_string(),
            branch: default_branch(),
        });
        let warnings = config.warnings();
        assert!(warnings.iter().any(|w| w.contains("owner/name")));
        assert!(warnings.iter().any(|w| w.contains("admin_token")));
    }
}
