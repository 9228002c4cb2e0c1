//! Last-resort probing of conventional resource paths.

use super::http_client::HttpClient;
use crate::endpoint::{join_url, EndpointDescriptor, HttpMethod, JSON_PROBE_NOTE};
use tracing::{debug, info, warn};

/// Conventional resource paths, probed in order.
pub const COMMON_PATHS: [&str; 11] = [
    "/api",
    "/api/v1",
    "/api/v2",
    "/products",
    "/users",
    "/posts",
    "/comments",
    "/auth/login",
    "/auth/register",
    "/todos",
    "/items",
];

/// GET each conventional path and keep those that answer below 500 with a JSON body.
pub async fn probe(base_url: &str, client: &HttpClient, timeout_ms: u64) -> Vec<EndpointDescriptor> {
    info!("probing common endpoints on {base_url}");
    let mut found = Vec::new();

    for path in COMMON_PATHS {
        let url = join_url(base_url, path);
        let resp = match client.get(&url, timeout_ms).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("probe failed for {url}: {e}");
                continue;
            }
        };
        debug!("checked {url} -> {}", resp.status);

        if resp.status < 500 && resp.json().is_ok() {
            info!("found JSON endpoint: {url}");
            found.push(EndpointDescriptor::new(HttpMethod::Get, path, JSON_PROBE_NOTE));
        }
    }

    info!("common-path probe found {} endpoints", found.len());
    found
}
