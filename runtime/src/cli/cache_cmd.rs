//! CLI handler for `api-inspector cache clear [base_url]`.

use crate::cache::StageCache;
use crate::cli::output::{self, Styled};
use crate::config::InspectorConfig;
use anyhow::Result;

/// Clear cached stage results for one base URL, or everything.
pub async fn run_clear(base_url: Option<&str>) -> Result<()> {
    let config = InspectorConfig::from_env();
    let mut cache = StageCache::from_settings(&config.cache)?;

    let removed = match base_url {
        Some(url) => cache.invalidate_base_url(url),
        None => cache.clear(),
    };

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "cleared": removed,
            "base_url": base_url,
            "cache_dir": cache.cache_dir().display().to_string(),
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        let s = Styled::new();
        match base_url {
            Some(url) => println!("  {} Cleared {removed} cached results for {url}", s.ok_sym()),
            None => println!("  {} Cleared {removed} cached results", s.ok_sym()),
        }
    }
    Ok(())
}
