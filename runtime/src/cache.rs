//! Stage-result caching: memoize discovery stages per base URL.
//!
//! Each entry is one JSON file holding the stage, the base URL and the
//! stage's raw result. Entries expire after a per-stage TTL.
//!
//! ## LRU eviction
//!
//! When the cache exceeds `max_entries`, expired entries are evicted first,
//! otherwise the least-recently-accessed entry (both from the index and from disk).

use crate::config::CacheSettings;
use anyhow::{Context, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Default maximum number of cached stage results before LRU eviction.
const DEFAULT_MAX_ENTRIES: usize = 200;

/// A cacheable discovery stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Spec,
    HtmlFallback,
    CommonPaths,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Spec, Stage::HtmlFallback, Stage::CommonPaths];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Spec => "spec",
            Stage::HtmlFallback => "html_fallback",
            Stage::CommonPaths => "common_paths",
        }
    }
}

/// Time-to-live for each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTtls {
    pub spec: Duration,
    pub html_fallback: Duration,
    pub common_paths: Duration,
}

impl StageTtls {
    fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Spec => self.spec,
            Stage::HtmlFallback => self.html_fallback,
            Stage::CommonPaths => self.common_paths,
        }
    }
}

impl Default for StageTtls {
    fn default() -> Self {
        Self {
            spec: Duration::from_secs(3600),
            html_fallback: Duration::from_secs(3600),
            common_paths: Duration::from_secs(1800),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    stage: Stage,
    base_url: String,
    value: T,
}

/// Cache entry with metadata.
struct CacheEntry {
    /// Path to the serialized result file.
    path: PathBuf,
    /// When the entry was cached.
    cached_at: SystemTime,
    /// Cache TTL.
    ttl: Duration,
    /// When the entry was last accessed (for LRU).
    last_accessed: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        SystemTime::now()
            .duration_since(self.cached_at)
            .map(|elapsed| elapsed >= self.ttl)
            .unwrap_or(true)
    }

    fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// Stage cache backed by the filesystem with LRU eviction.
pub struct StageCache {
    /// Base directory for cached results.
    cache_dir: PathBuf,
    /// In-memory index keyed by `stage:base_url`.
    index: HashMap<String, CacheEntry>,
    ttls: StageTtls,
    /// Maximum number of cached results before LRU eviction.
    max_entries: usize,
}

fn normalize_base_url(base_url: &str) -> &str {
    base_url.trim().trim_end_matches('/')
}

fn cache_key(stage: Stage, base_url: &str) -> String {
    format!("{}:{}", stage.as_str(), normalize_base_url(base_url))
}

/// Percent-encoded key, so distinct keys never share a file.
fn file_name(key: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
    format!("{encoded}.json")
}

impl StageCache {
    /// Open (or create) a cache in the given directory.
    ///
    /// Existing `.json` entries are re-indexed using their modification time
    /// as the cached-at instant, so results from earlier runs are reusable.
    pub fn new(cache_dir: PathBuf, ttls: StageTtls) -> Result<Self> {
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("failed to create cache dir: {}", cache_dir.display()))?;

        let mut index = HashMap::new();

        if let Ok(entries) = fs::read_dir(&cache_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Ok(raw) = fs::read(&path) else {
                    continue;
                };
                let Ok(envelope) = serde_json::from_slice::<Envelope<IgnoredAny>>(&raw) else {
                    continue;
                };
                let cached_at = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or_else(|_| SystemTime::now());
                index.insert(
                    cache_key(envelope.stage, &envelope.base_url),
                    CacheEntry {
                        path,
                        cached_at,
                        ttl: ttls.for_stage(envelope.stage),
                        last_accessed: Instant::now(),
                    },
                );
            }
        }

        tracing::debug!(
            "StageCache initialized: {} entries from {}",
            index.len(),
            cache_dir.display()
        );

        Ok(Self {
            cache_dir,
            index,
            ttls,
            max_entries: DEFAULT_MAX_ENTRIES,
        })
    }

    /// Open the cache described by the configuration.
    pub fn from_settings(settings: &CacheSettings) -> Result<Self> {
        Self::new(
            settings.dir.clone(),
            StageTtls {
                spec: settings.spec_ttl,
                html_fallback: settings.html_ttl,
                common_paths: settings.probe_ttl,
            },
        )
    }

    /// Load a fresh cached result for `(stage, base_url)`.
    ///
    /// Expired, unreadable or mismatched entries read as a miss.
    pub fn get<T: DeserializeOwned>(&mut self, stage: Stage, base_url: &str) -> Option<T> {
        let key = cache_key(stage, base_url);
        let entry = self.index.get_mut(&key)?;
        if entry.is_expired() {
            return None;
        }
        entry.touch();

        let raw = fs::read(&entry.path).ok()?;
        match serde_json::from_slice::<Envelope<T>>(&raw) {
            Ok(envelope) if cache_key(envelope.stage, &envelope.base_url) == key => {
                tracing::debug!("cache hit: {key}");
                Some(envelope.value)
            }
            _ => None,
        }
    }

    /// Cache a stage result.
    ///
    /// If the cache is full, an entry is evicted first.
    pub fn put<T: Serialize>(&mut self, stage: Stage, base_url: &str, value: &T) -> Result<PathBuf> {
        let key = cache_key(stage, base_url);
        if self.index.len() >= self.max_entries && !self.index.contains_key(&key) {
            self.evict_lru();
        }

        let path = self.cache_dir.join(file_name(&key));
        let envelope = Envelope {
            stage,
            base_url: normalize_base_url(base_url).to_string(),
            value,
        };
        let data = serde_json::to_vec(&envelope).context("failed to serialize cache entry")?;
        fs::write(&path, data)
            .with_context(|| format!("failed to write cache file: {}", path.display()))?;

        self.index.insert(
            key,
            CacheEntry {
                path: path.clone(),
                cached_at: SystemTime::now(),
                ttl: self.ttls.for_stage(stage),
                last_accessed: Instant::now(),
            },
        );

        Ok(path)
    }

    /// Invalidate (remove) one cached stage result.
    pub fn invalidate(&mut self, stage: Stage, base_url: &str) {
        self.remove_key(&cache_key(stage, base_url));
    }

    /// Invalidate every stage cached for `base_url`.
    pub fn invalidate_base_url(&mut self, base_url: &str) -> usize {
        let before = self.index.len();
        for stage in Stage::ALL {
            self.invalidate(stage, base_url);
        }
        before - self.index.len()
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> usize {
        let keys: Vec<String> = self.index.keys().cloned().collect();
        let n = keys.len();
        for key in keys {
            self.remove_key(&key);
        }
        n
    }

    fn remove_key(&mut self, key: &str) {
        if let Some(entry) = self.index.remove(key) {
            let _ = fs::remove_file(&entry.path);
        }
    }

    /// Evict expired entries, or the least-recently-used one when none are expired.
    fn evict_lru(&mut self) {
        let expired: Vec<String> = self
            .index
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        if !expired.is_empty() {
            for key in expired {
                self.remove_key(&key);
            }
            return;
        }

        if let Some(lru_key) = self
            .index
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone())
        {
            tracing::info!("evicting LRU cache entry: {lru_key}");
            self.remove_key(&lru_key);
        }
    }

    /// Number of cached results (including expired).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Remove all expired entries.
    pub fn cleanup_expired(&mut self) {
        let expired: Vec<String> = self
            .index
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in expired {
            self.remove_key(&key);
        }
    }

    /// Cache directory path.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}
