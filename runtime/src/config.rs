//! Configuration loading and resolution.
//!
//! Defaults are overlaid by `INSPECTOR_*` environment variables, and the CLI
//! overlays its own flags on top of the result.

use std::path::PathBuf;
use std::time::Duration;

/// Default OpenAI-compatible endpoint used by the summarizer.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default summarization model.
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Per-call timeouts for each pipeline stage, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub spec_ms: u64,
    pub page_ms: u64,
    pub render_ms: u64,
    pub verify_ms: u64,
    pub probe_ms: u64,
    pub try_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            spec_ms: 5_000,
            page_ms: 6_000,
            render_ms: 20_000,
            verify_ms: 4_000,
            probe_ms: 4_000,
            try_ms: 30_000,
        }
    }
}

/// Cache location and per-stage time-to-live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Disable reads and writes entirely.
    pub enabled: bool,
    /// Skip reads but still record fresh results.
    pub fresh: bool,
    pub dir: PathBuf,
    pub spec_ttl: Duration,
    pub html_ttl: Duration,
    pub probe_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            fresh: false,
            dir: default_home().join("cache"),
            spec_ttl: Duration::from_secs(3600),
            html_ttl: Duration::from_secs(3600),
            probe_ttl: Duration::from_secs(1800),
        }
    }
}

/// Settings for the chat-completions summarizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizerSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: None,
            timeout_ms: 60_000,
        }
    }
}

/// Top-level inspector configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorConfig {
    pub timeouts: Timeouts,
    /// Allow the headless-browser pass of the HTML scan.
    pub render: bool,
    pub cache: CacheSettings,
    pub summarizer: SummarizerSettings,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            render: true,
            cache: CacheSettings::default(),
            summarizer: SummarizerSettings::default(),
        }
    }
}

impl InspectorConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let ms = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let secs = |key: &str| ms(key).map(Duration::from_secs);

        if let Some(v) = ms("INSPECTOR_SPEC_TIMEOUT_MS") {
            config.timeouts.spec_ms = v;
        }
        if let Some(v) = ms("INSPECTOR_PAGE_TIMEOUT_MS") {
            config.timeouts.page_ms = v;
        }
        if let Some(v) = ms("INSPECTOR_RENDER_TIMEOUT_MS") {
            config.timeouts.render_ms = v;
        }
        if let Some(v) = ms("INSPECTOR_VERIFY_TIMEOUT_MS") {
            config.timeouts.verify_ms = v;
        }
        if let Some(v) = ms("INSPECTOR_PROBE_TIMEOUT_MS") {
            config.timeouts.probe_ms = v;
        }

        if let Some(v) = lookup("INSPECTOR_NO_RENDER") {
            config.render = !is_truthy(&v);
        }
        if let Some(v) = lookup("INSPECTOR_NO_CACHE") {
            config.cache.enabled = !is_truthy(&v);
        }
        if let Some(dir) = lookup("INSPECTOR_CACHE_DIR").filter(|d| !d.is_empty()) {
            config.cache.dir = PathBuf::from(dir);
        }
        if let Some(ttl) = secs("INSPECTOR_SPEC_TTL_SECS") {
            config.cache.spec_ttl = ttl;
        }
        if let Some(ttl) = secs("INSPECTOR_HTML_TTL_SECS") {
            config.cache.html_ttl = ttl;
        }
        if let Some(ttl) = secs("INSPECTOR_PROBE_TTL_SECS") {
            config.cache.probe_ttl = ttl;
        }

        if let Some(url) = lookup("INSPECTOR_LLM_BASE_URL").filter(|u| !u.is_empty()) {
            config.summarizer.base_url = url;
        }
        if let Some(model) = lookup("INSPECTOR_LLM_MODEL").filter(|m| !m.is_empty()) {
            config.summarizer.model = model;
        }
        config.summarizer.api_key = lookup("INSPECTOR_LLM_API_KEY")
            .or_else(|| lookup("GROQ_API_KEY"))
            .filter(|k| !k.trim().is_empty());

        config
    }
}

/// `~/.api-inspector`, falling back to `/tmp` without a home directory.
pub fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".api-inspector")
}

fn is_truthy(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = InspectorConfig::from_lookup(|_| None);
        assert_eq!(config.timeouts.spec_ms, 5_000);
        assert_eq!(config.timeouts.page_ms, 6_000);
        assert_eq!(config.timeouts.render_ms, 20_000);
        assert_eq!(config.timeouts.verify_ms, 4_000);
        assert_eq!(config.timeouts.probe_ms, 4_000);
        assert_eq!(config.cache.spec_ttl, Duration::from_secs(3600));
        assert_eq!(config.cache.probe_ttl, Duration::from_secs(1800));
        assert!(config.render);
        assert!(config.cache.enabled);
        assert!(config.summarizer.api_key.is_none());
        assert_eq!(config.summarizer.model, DEFAULT_LLM_MODEL);
    }

    #[test]
    fn test_env_overrides() {
        let config = InspectorConfig::from_lookup(lookup_from(&[
            ("INSPECTOR_PAGE_TIMEOUT_MS", "1500"),
            ("INSPECTOR_NO_RENDER", "true"),
            ("INSPECTOR_CACHE_DIR", "/var/tmp/inspector"),
            ("INSPECTOR_PROBE_TTL_SECS", "60"),
            ("GROQ_API_KEY", "gsk-test"),
            ("INSPECTOR_LLM_MODEL", "tiny"),
        ]));
        assert_eq!(config.timeouts.page_ms, 1500);
        assert!(!config.render);
        assert_eq!(config.cache.dir, PathBuf::from("/var/tmp/inspector"));
        assert_eq!(config.cache.probe_ttl, Duration::from_secs(60));
        assert_eq!(config.summarizer.api_key.as_deref(), Some("gsk-test"));
        assert_eq!(config.summarizer.model, "tiny");
    }

    #[test]
    fn test_explicit_key_wins_and_garbage_is_ignored() {
        let config = InspectorConfig::from_lookup(lookup_from(&[
            ("INSPECTOR_LLM_API_KEY", "primary"),
            ("GROQ_API_KEY", "secondary"),
            ("INSPECTOR_SPEC_TIMEOUT_MS", "soon"),
        ]));
        assert_eq!(config.summarizer.api_key.as_deref(), Some("primary"));
        assert_eq!(config.timeouts.spec_ms, 5_000);
    }
}
