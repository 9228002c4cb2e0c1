//! Chromium-based renderer using chromiumoxide.

use super::Renderer;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. INSPECTOR_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("INSPECTOR_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.api-inspector/chromium/
    let home = crate::config::default_home();
    let candidates = if cfg!(target_os = "macos") {
        vec![
            home.join("chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
            home.join("chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
            home.join("chromium/chrome"),
        ]
    } else {
        vec![
            home.join("chromium/chrome-linux64/chrome"),
            home.join("chromium/chrome"),
        ]
    };
    for c in candidates {
        if c.exists() {
            return Some(c);
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer. Launches one headless browser per `render` call.
pub struct ChromiumRenderer {
    chrome_path: PathBuf,
}

impl ChromiumRenderer {
    /// Locate Chromium; fails when no binary can be found.
    pub fn new() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set INSPECTOR_CHROMIUM_PATH or install Chrome.")?;
        Ok(Self { chrome_path })
    }

    /// Use an explicit Chromium binary.
    pub fn with_path(chrome_path: PathBuf) -> Self {
        Self { chrome_path }
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(&self, url: &str, timeout_ms: u64) -> Result<String> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .context("failed to launch Chromium")?;

        // Drive the CDP connection until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let result = render_page(&browser, url, timeout_ms).await;

        // Teardown runs whatever `render_page` returned.
        if let Err(e) = browser.close().await {
            debug!("browser close failed: {e}");
        }
        let _ = browser.wait().await;
        handler_task.abort();

        result
    }
}

async fn render_page(browser: &Browser, url: &str, timeout_ms: u64) -> Result<String> {
    let start = Instant::now();
    let page = browser
        .new_page("about:blank")
        .await
        .context("failed to create new page")?;

    let navigation = tokio::time::timeout(Duration::from_millis(timeout_ms), page.goto(url)).await;

    let html = match navigation {
        Ok(Ok(_)) => page.content().await.context("failed to get HTML"),
        Ok(Err(e)) => Err(anyhow::anyhow!("navigation failed: {e}")),
        Err(_) => Err(anyhow::anyhow!("navigation timed out after {timeout_ms}ms")),
    };

    let _ = page.close().await;
    let html = html?;

    if html.is_empty() {
        bail!("rendered document for {url} is empty");
    }

    debug!(
        "rendered {url} in {}ms ({} bytes)",
        start.elapsed().as_millis(),
        html.len()
    );
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_fails_at_render_time() {
        let renderer = ChromiumRenderer::with_path(PathBuf::from("/nonexistent/chrome"));
        assert!(renderer.is_available());
        assert!(renderer.render("about:blank", 1000).await.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_renders_script_output() {
        let renderer = ChromiumRenderer::new().expect("failed to locate Chromium");

        let html = renderer
            .render(
                "data:text/html,<pre id='x'></pre><script>document.getElementById('x').textContent='GET /widgets'</script>",
                10000,
            )
            .await
            .expect("render failed");

        assert!(html.contains("GET /widgets"));
    }
}
