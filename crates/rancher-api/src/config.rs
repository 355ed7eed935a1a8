//! Client configuration.
//!
//! # Configuration
//!
//! ```toml
//! url = "http://rancher.local:8080/v2-beta"
//! access_key = "ABCDEF"
//! secret_key = "secret"
//! strict = false
//!
//! [headers]
//! Accept = "application/json"
//!
//! [cache]
//! enabled = true
//! ttl_secs = 86400
//! dir = "~/.rancherapi"
//!
//! [timeouts]
//! connect_secs = 5
//! read_secs = 5
//!
//! [retry]
//! attempts = 3
//! delay_ms = 100
//! ```
//!
//! # Environment Variables
//!
//! - `RANCHER_URL` - API endpoint
//! - `RANCHER_ACCESS_KEY` / `RANCHER_SECRET_KEY` - basic auth credentials
//! - `RANCHER_STRICT` - validate list filters ("true"/"false")
//! - `RANCHER_CACHE` - enable the schema cache ("true"/"false")
//! - `RANCHER_CACHE_DIR` - schema cache directory
//! - `RANCHER_CACHE_TTL` - schema cache freshness in seconds

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_CACHE_TTL, default_cache_dir};
use crate::error::{Error, Result};
use crate::retry::{DEFAULT_ATTEMPTS, DEFAULT_RETRY_DELAY};
use crate::transport::DEFAULT_TIMEOUT;

/// Everything needed to build a [`crate::RancherClient`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API endpoint; the schema is discovered from here.
    pub url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Custom headers. `Accept: application/json` when empty.
    pub headers: BTreeMap<String, String>,
    /// Reject list filters the schema does not declare.
    pub strict: bool,
    pub cache: CacheConfig,
    pub timeouts: TimeoutConfig,
    pub retry: RetryConfig,
}

/// Schema cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Default: false
    pub enabled: bool,
    /// Default: 86400 (24 hours)
    pub ttl_secs: u64,
    /// Default: `~/.rancherapi`
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            dir: None,
        }
    }
}

impl CacheConfig {
    /// Cache directory, falling back to `~/.rancherapi`.
    pub fn effective_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_cache_dir)
    }

    /// A zero TTL means "use the default", as it always has.
    pub fn ttl(&self) -> Duration {
        if self.ttl_secs == 0 {
            DEFAULT_CACHE_TTL
        } else {
            Duration::from_secs(self.ttl_secs)
        }
    }
}

/// Per-request timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub connect_secs: u64,
    pub read_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_TIMEOUT.as_secs(),
            read_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Conflict retry settings for mutating calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Read and parse a TOML file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flag = |name: &str| {
            lookup(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        };

        if let Some(url) = lookup("RANCHER_URL") {
            self.url = Some(url);
        }
        if let Some(key) = lookup("RANCHER_ACCESS_KEY") {
            self.access_key = Some(key);
        }
        if let Some(key) = lookup("RANCHER_SECRET_KEY") {
            self.secret_key = Some(key);
        }
        if let Some(strict) = flag("RANCHER_STRICT") {
            self.strict = strict;
        }
        if let Some(enabled) = flag("RANCHER_CACHE") {
            self.cache.enabled = enabled;
        }
        if let Some(dir) = lookup("RANCHER_CACHE_DIR") {
            self.cache.dir = Some(PathBuf::from(dir));
        }
        if let Some(ttl) = lookup("RANCHER_CACHE_TTL") {
            match ttl.parse() {
                Ok(secs) => self.cache.ttl_secs = secs,
                Err(_) => tracing::warn!(value = %ttl, "Ignoring invalid RANCHER_CACHE_TTL"),
            }
        }
    }

    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.connect_secs)
    }

    /// Read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.read_secs)
    }

    /// Pause between conflict retries as a `Duration`.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry.delay_ms)
    }
}
