//! Heuristic endpoint discovery from documentation pages.
//!
//! Used when no structured specification is served. Each candidate page is
//! fetched over plain HTTP first; only when that static pass yields nothing is
//! the page rendered in a headless browser and scanned again.

use super::http_client::HttpClient;
use crate::endpoint::{join_url, EndpointDescriptor, HttpMethod, HTML_FALLBACK_NOTE};
use crate::renderer::Renderer;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Documentation pages tried in order, relative to the base URL.
pub const DOC_PAGES: [&str; 6] = ["", "/docs", "/swagger", "/swagger-ui", "/api/docs", "/redoc"];

/// Optional verb followed by whitespace, then a `/`-rooted path-like token.
static ENDPOINT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(GET|POST|PUT|PATCH|DELETE)\s+)?(/[A-Za-z0-9_\-/{}.]+)").expect("valid regex")
});

/// Verbs glued together by slashes, e.g. a `PUT/PATCH/DELETE` column header.
static VERB_COLLISION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)PUT/?PATCH/?DELETE").expect("valid regex"));

/// Version-like tokens such as `/2.0` or `/10.3.1`.
static VERSION_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/[0-9.]+$").expect("valid regex"));

static TEXT_CONTAINERS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("code, pre, div, p").expect("valid selector"));

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "template", "noscript"];

/// Too generic to be useful on their own.
const GENERIC_PATHS: [&str; 4] = ["/", "/api", "/v1", "/v2"];

/// Paths already accepted during one scan, shared across every page.
///
/// Keyed by path alone: a `POST /items` found after `GET /items` is dropped.
#[derive(Debug, Default)]
pub struct SeenPaths {
    paths: HashSet<String>,
}

impl SeenPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path`; returns `false` if it was already seen.
    pub fn insert(&mut self, path: &str) -> bool {
        self.paths.insert(path.to_string())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Which pass of a page scan produced its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPass {
    Static,
    Rendered,
}

impl ScanPass {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanPass::Static => "static HTML",
            ScanPass::Rendered => "rendered",
        }
    }
}

/// Timeouts for the two passes of a page scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanTimeouts {
    pub page_ms: u64,
    pub render_ms: u64,
}

/// Shape filter for a candidate path, independent of the seen set.
pub fn is_plausible_path(path: &str) -> bool {
    let len = path.chars().count();
    if !(3..=80).contains(&len) {
        return false;
    }
    if ["//", " ", ","].iter().any(|bad| path.contains(bad)) {
        return false;
    }
    let lower = path.to_lowercase();
    if GENERIC_PATHS.contains(&lower.as_str()) {
        return false;
    }
    if VERB_COLLISION.is_match(path) {
        return false;
    }
    !VERSION_LIKE.is_match(path)
}

/// Visible text of the elements likely to hold documentation content.
///
/// Each element contributes its trimmed text nodes joined by single spaces.
/// Nested containers contribute their text again; the seen set absorbs that.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&TEXT_CONTAINERS)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text nodes under `el`, skipping anything inside a non-rendered element.
fn element_text(el: ElementRef<'_>) -> String {
    el.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            });
            (!hidden).then_some(&**text)
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract endpoint candidates from one HTML document.
///
/// Accepted paths are recorded in `seen`; anything already there is skipped.
pub fn extract_from_html(html: &str, seen: &mut SeenPaths) -> Vec<EndpointDescriptor> {
    let text = visible_text(html);
    let mut found = Vec::new();

    for caps in ENDPOINT_TOKEN.captures_iter(&text) {
        let Some(path) = caps.get(2).map(|m| m.as_str().trim()) else {
            continue;
        };
        if !is_plausible_path(path) || !seen.insert(path) {
            continue;
        }
        let method = caps
            .get(1)
            .map(|m| HttpMethod::from_name(m.as_str()))
            .unwrap_or_default();
        found.push(EndpointDescriptor::new(method, path, HTML_FALLBACK_NOTE));
    }

    found
}

/// Scan one documentation page: static pass, then rendered pass only if needed.
///
/// Any static result returns early and the browser is never launched.
/// Fetch and render failures yield an empty list.
pub async fn scan_page(
    url: &str,
    client: &HttpClient,
    renderer: &dyn Renderer,
    timeouts: ScanTimeouts,
    seen: &mut SeenPaths,
) -> (Vec<EndpointDescriptor>, Option<ScanPass>) {
    let resp = match client.get(url, timeouts.page_ms).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!("fallback fetch failed for {url}: {e}");
            return (Vec::new(), None);
        }
    };
    if resp.status != 200 {
        debug!("skipping {url} (status {})", resp.status);
        return (Vec::new(), None);
    }

    let static_eps = extract_from_html(&resp.body, seen);
    if !static_eps.is_empty() {
        info!("found {} endpoints at {url} ({})", static_eps.len(), ScanPass::Static.as_str());
        return (static_eps, Some(ScanPass::Static));
    }

    if !renderer.is_available() {
        debug!("no renderer available; skipping rendered pass for {url}");
        return (Vec::new(), None);
    }

    info!("rendering {url} in headless browser");
    match renderer.render(url, timeouts.render_ms).await {
        Ok(html) => {
            let rendered_eps = extract_from_html(&html, seen);
            if !rendered_eps.is_empty() {
                info!("found {} endpoints at {url} ({})", rendered_eps.len(), ScanPass::Rendered.as_str());
                return (rendered_eps, Some(ScanPass::Rendered));
            }
            (Vec::new(), None)
        }
        Err(e) => {
            warn!("render failed for {url}: {e:#}");
            (Vec::new(), None)
        }
    }
}

/// Scan every documentation page in order and collect path-unique candidates.
pub async fn scan(
    base_url: &str,
    client: &HttpClient,
    renderer: &dyn Renderer,
    timeouts: ScanTimeouts,
) -> Vec<EndpointDescriptor> {
    let mut seen = SeenPaths::new();
    let mut endpoints = Vec::new();

    for page in DOC_PAGES {
        let url = join_url(base_url, page);
        debug!("checking {url}");
        let (found, pass) = scan_page(&url, client, renderer, timeouts, &mut seen).await;
        if let Some(pass) = pass {
            debug!("{url}: {} new endpoints from {} pass", found.len(), pass.as_str());
        }
        endpoints.extend(found);
    }

    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(!is_plausible_path("/a"));
        assert!(is_plausible_path("/ab"));
        let long = format!("/{}", "a".repeat(80));
        assert!(!is_plausible_path(&long));
        let max = format!("/{}", "a".repeat(79));
        assert!(is_plausible_path(&max));
    }

    #[test]
    fn test_rejects_forbidden_substrings() {
        assert!(!is_plausible_path("/api//users"));
        assert!(!is_plausible_path("/users list"));
        assert!(!is_plausible_path("/users,posts"));
    }

    #[test]
    fn test_rejects_generic_paths() {
        for p in ["/", "/api", "/v1", "/v2", "/API", "/V1"] {
            assert!(!is_plausible_path(p), "{p} should be rejected");
        }
        assert!(is_plausible_path("/api/users"));
        assert!(is_plausible_path("/v3"));
    }

    #[test]
    fn test_rejects_version_like_and_verb_collisions() {
        assert!(!is_plausible_path("/2.0"));
        assert!(!is_plausible_path("/10.3.1"));
        assert!(is_plausible_path("/v2.0"));
        assert!(!is_plausible_path("/PUT/PATCH/DELETE"));
        assert!(!is_plausible_path("/items/put/patch/delete"));
        assert!(!is_plausible_path("/PUTPATCHDELETE"));
    }

    #[test]
    fn test_extracts_verbs_and_defaults_to_get() {
        let html = r#"<html><body>
            <pre>POST /widgets</pre>
            <code>/widgets/{id}</code>
            <p>DELETE   /widgets/{id}/parts</p>
        </body></html>"#;
        let mut seen = SeenPaths::new();
        let eps = extract_from_html(html, &mut seen);
        let lines: Vec<String> = eps.iter().map(|e| e.one_line()).collect();
        assert_eq!(
            lines,
            vec![
                "POST /widgets - Found via HTML fallback",
                "GET /widgets/{id} - Found via HTML fallback",
                "DELETE /widgets/{id}/parts - Found via HTML fallback",
            ]
        );
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_ignores_text_outside_content_elements() {
        let html = "<html><head><title>GET /title-only</title></head><body><span>GET /span-only</span></body></html>";
        let mut seen = SeenPaths::new();
        assert!(extract_from_html(html, &mut seen).is_empty());
    }

    #[test]
    fn test_seen_set_dedups_by_path_across_documents() {
        let mut seen = SeenPaths::new();
        let first = extract_from_html("<code>GET /items</code>", &mut seen);
        let second = extract_from_html("<code>POST /items</code><code>GET /orders</code>", &mut seen);

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].method, HttpMethod::Get);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].path, "/orders");
        assert!(seen.contains("/items"));
    }

    #[test]
    fn test_nested_containers_do_not_duplicate() {
        let html = "<div><div><p>GET /nested/path</p></div></div>";
        let mut seen = SeenPaths::new();
        let eps = extract_from_html(html, &mut seen);
        assert_eq!(eps.len(), 1);
    }

    #[test]
    fn test_script_and_style_text_is_not_visible() {
        let html = r#"<div id="app"><script>window.cfg = {asset: "/static/bundle.js"};</script><style>.x{background:url(/img/bg.png)}</style></div>
            <p>Loading<noscript>GET /noscript/only</noscript></p>
            <template><pre>GET /from/template</pre></template>"#;
        assert_eq!(visible_text(html), "Loading");

        let mut seen = SeenPaths::new();
        assert!(extract_from_html(html, &mut seen).is_empty());
        assert!(seen.is_empty());
    }

    #[test]
    fn test_visible_text_joins_with_single_spaces() {
        let text = visible_text("<p>  GET <b> /a/b </b></p><code>x</code>");
        assert_eq!(text, "GET /a/b x");
    }
}
