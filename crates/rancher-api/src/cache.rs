//! On-disk schema cache.
//!
//! One file per (server URL, access key) pair, named after a SHA-256
//! fingerprint of both, holding the schema document text verbatim. A file is
//! only served while its modification age is under the TTL. The cache is
//! best-effort: read failures are a miss, and write failures are reported to
//! the caller to log, never to abort a schema load. Concurrent writers are
//! not coordinated; the last one wins.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};

/// Default freshness window.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Directory name under the home directory.
const CACHE_DIR_NAME: &str = ".rancherapi";

/// Default cache directory: `~/.rancherapi`.
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CACHE_DIR_NAME)
}

/// Schema documents cached in a directory.
#[derive(Debug, Clone)]
pub struct SchemaCache {
    dir: PathBuf,
    ttl: Duration,
}

impl SchemaCache {
    /// Create a cache rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Directory the cache files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// How long a stored document stays fresh.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stable fingerprint of the server URL and credential identity.
    pub fn fingerprint(url: &str, access_key: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        if let Some(key) = access_key {
            hasher.update(key.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Where the schema for this pair lives.
    pub fn path_for(&self, url: &str, access_key: Option<&str>) -> PathBuf {
        self.dir
            .join(format!("schema-{}.json", Self::fingerprint(url, access_key)))
    }

    /// Cached schema text, if present and younger than the TTL.
    pub fn load(&self, url: &str, access_key: Option<&str>) -> Option<String> {
        let path = self.path_for(url, access_key);
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        // a timestamp in the future counts as brand new
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age >= self.ttl {
            tracing::debug!(path = %path.display(), age_secs = age.as_secs(), "Cached schema is stale");
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "Using cached schema");
                Some(text)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read cached schema");
                None
            }
        }
    }

    /// Write the schema text, creating the cache directory on first use.
    pub fn store(&self, url: &str, access_key: Option<&str>, text: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(url, access_key);
        std::fs::write(&path, text)?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "Cached schema");
        Ok(path)
    }
}
