//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` trait that abstracts over the browser engine
//! (currently Chromium via chromiumoxide). Every `render` call owns its
//! browser for exactly that call: launched on entry, torn down before return.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// A browser engine that renders a page and returns the post-script HTML.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Navigate to `url` within `timeout_ms` and return the rendered document.
    async fn render(&self, url: &str, timeout_ms: u64) -> Result<String>;

    /// Whether this renderer can actually render pages.
    fn is_available(&self) -> bool {
        true
    }
}

/// A no-op renderer used when Chromium is unavailable or rendering is disabled.
///
/// The HTML scan's static pass works without a browser; this stub makes the
/// rendered pass fail, which the scanner treats as a zero-yield page.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn render(&self, _url: &str, _timeout_ms: u64) -> Result<String> {
        Err(anyhow::anyhow!("browser not available (HTTP-only mode)"))
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_renderer_fails() {
        let renderer = NoopRenderer;
        assert!(!renderer.is_available());
        assert!(renderer.render("http://x.test/docs", 1000).await.is_err());
    }
}
