use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::scoring::JournalMetrics;

/// Configuration for the on-disk journal metrics cache
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
    pub ttl: Duration,
}

/// Get the platform-appropriate cache directory for lit-review
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("lit-review/metrics-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/lit-review/metrics-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Clear the metrics cache directory
pub fn clear_cache() -> Result<()> {
    clear_cache_at(&get_cache_path())
}

fn clear_cache_at(cache_path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// Cached serial metrics with timestamp
#[derive(Debug, Serialize, Deserialize)]
struct CachedMetrics {
    metrics: JournalMetrics,
    checked_at: u64, // Unix timestamp
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn cache_key(issn: &str) -> String {
    format!("serial:{}", crate::scoring::normalize_issn(issn))
}

/// Disk cache of journal metrics keyed by ISSN.
///
/// Entries older than the TTL are treated as missing. A disabled cache never
/// reads or writes.
#[derive(Clone, Debug)]
pub struct MetricsCache {
    path: PathBuf,
    config: CacheConfig,
}

impl MetricsCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::at(get_cache_path(), config)
    }

    pub fn at(path: PathBuf, config: CacheConfig) -> Self {
        Self { path, config }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Fresh cached metrics for `issn`, if any
    pub fn get(&self, issn: &str) -> Option<JournalMetrics> {
        if !self.config.enabled {
            return None;
        }
        let bytes = cacache::read_sync(&self.path, cache_key(issn)).ok()?;
        let cached: CachedMetrics = serde_json::from_slice(&bytes).ok()?;

        let age = now_secs().saturating_sub(cached.checked_at);
        if age < self.config.ttl.as_secs() {
            Some(cached.metrics)
        } else {
            None
        }
    }

    pub fn put(&self, issn: &str, metrics: JournalMetrics) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let cached = CachedMetrics {
            metrics,
            checked_at: now_secs(),
        };
        let json = serde_json::to_vec(&cached)?;
        cacache::write_sync(&self.path, cache_key(issn), json)
            .context("Failed to write metrics cache")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(dir: &Path, enabled: bool, ttl: Duration) -> MetricsCache {
        MetricsCache::at(dir.to_path_buf(), CacheConfig { enabled, ttl })
    }

    fn metrics() -> JournalMetrics {
        JournalMetrics {
            citescore: Some(6.1),
            sjr: Some(1.2),
            snip: None,
        }
    }

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), true, Duration::from_secs(3600));
        cache.put("0277-9536", metrics()).unwrap();

        // Lookup is insensitive to ISSN formatting
        assert_eq!(cache.get("02779536"), Some(metrics()));
        assert_eq!(cache.get("1234-5678"), None);
    }

    #[test]
    fn test_expired_entry_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), true, Duration::ZERO);
        cache.put("02779536", metrics()).unwrap();
        assert_eq!(cache.get("02779536"), None);
    }

    #[test]
    fn test_disabled_cache_is_inert() {
        let dir = tempfile::tempdir().unwrap();
        let disabled = cache(dir.path(), false, Duration::from_secs(3600));
        disabled.put("02779536", metrics()).unwrap();

        let enabled = cache(dir.path(), true, Duration::from_secs(3600));
        assert_eq!(enabled.get("02779536"), None);
        assert_eq!(disabled.get("02779536"), None);
    }

    #[test]
    fn test_clear_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("never-created");
        assert!(clear_cache_at(&target).is_ok());
    }
}
