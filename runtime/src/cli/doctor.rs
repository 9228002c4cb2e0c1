//! Environment readiness check.

use crate::cli::output::{self, Styled};
use crate::config::InspectorConfig;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::Path;

/// Check Chromium availability, the cache directory, and the summarizer key.
pub async fn run() -> Result<()> {
    let config = InspectorConfig::from_env();
    let chromium = find_chromium();
    let cache_ok = dir_writable(&config.cache.dir);
    let has_key = config.summarizer.api_key.is_some();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "version": env!("CARGO_PKG_VERSION"),
            "chromium": chromium.as_ref().map(|p| p.display().to_string()),
            "render_enabled": config.render,
            "cache_dir": config.cache.dir.display().to_string(),
            "cache_writable": cache_ok,
            "summarizer_key": has_key,
            "summarizer_model": config.summarizer.model,
        }));
        return Ok(());
    }

    let s = Styled::new();
    println!("API Inspector Doctor");
    println!("====================");
    println!();
    println!("OS:      {}", std::env::consts::OS);
    println!("Arch:    {}", std::env::consts::ARCH);
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    match &chromium {
        Some(path) => println!("{} Chromium found: {}", s.ok_sym(), path.display()),
        None => println!(
            "{} Chromium NOT found. JS-rendered docs pages will be skipped. Set INSPECTOR_CHROMIUM_PATH to enable.",
            s.warn_sym()
        ),
    }
    if !config.render {
        println!("{} Rendering disabled by INSPECTOR_NO_RENDER", s.warn_sym());
    }

    if !config.cache.enabled {
        println!("{} Stage cache disabled by INSPECTOR_NO_CACHE", s.warn_sym());
    } else if cache_ok {
        println!("{} Cache directory writable: {}", s.ok_sym(), config.cache.dir.display());
    } else {
        println!("{} Cache directory not writable: {}", s.err_sym(), config.cache.dir.display());
    }

    if has_key {
        println!(
            "{} Summarizer key set (model {})",
            s.ok_sym(),
            config.summarizer.model
        );
    } else {
        println!("{} No GROQ_API_KEY; `--summarize` will be skipped", s.warn_sym());
    }

    println!();
    println!("Status: READY");
    if chromium.is_none() || !has_key {
        println!("  Discovery works; some optional features are unavailable.");
    }

    Ok(())
}

fn dir_writable(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".doctor-write-test");
    let ok = std::fs::write(&probe, b"ok").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_writable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(dir_writable(&dir.path().join("cache")));
        assert!(!dir.path().join("cache/.doctor-write-test").exists());
    }
}
