//! Liveness verification for heuristically discovered endpoints.

use super::http_client::{HttpClient, HttpResponse};
use crate::endpoint::{join_url, EndpointDescriptor};
use tracing::debug;

/// Whether a response looks like real API output rather than a documentation page.
pub fn looks_live(resp: &HttpResponse) -> bool {
    (200..500).contains(&resp.status) && !resp.content_type().contains("text/html")
}

/// Request each candidate with its own method and keep the ones that answer like an API.
///
/// Input order is preserved. Request failures drop the candidate; nothing is retried.
pub async fn verify(
    base_url: &str,
    candidates: Vec<EndpointDescriptor>,
    client: &HttpClient,
    timeout_ms: u64,
) -> Vec<EndpointDescriptor> {
    let mut live = Vec::with_capacity(candidates.len());

    for ep in candidates {
        let url = join_url(base_url, &ep.path);
        let method = match ep.method.to_reqwest() {
            Ok(m) => m,
            Err(e) => {
                debug!("dropping {}: {e}", ep.path);
                continue;
            }
        };

        match client.request(method, &url, timeout_ms).await {
            Ok(resp) if looks_live(&resp) => live.push(ep),
            Ok(resp) => debug!(
                "dropping {} {url}: status {} content-type '{}'",
                ep.method,
                resp.status,
                resp.content_type()
            ),
            Err(e) => debug!("dropping {} {url}: {e}", ep.method),
        }
    }

    live
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(status: u16, content_type: Option<&str>) -> HttpResponse {
        HttpResponse {
            final_url: "http://x.test/a".to_string(),
            status,
            headers: content_type
                .map(|ct| vec![("content-type".to_string(), ct.to_string())])
                .unwrap_or_default(),
            body: String::new(),
        }
    }

    #[test]
    fn test_status_window() {
        assert!(looks_live(&resp(200, Some("application/json"))));
        assert!(looks_live(&resp(404, Some("application/json"))));
        assert!(looks_live(&resp(499, None)));
        assert!(!looks_live(&resp(199, None)));
        assert!(!looks_live(&resp(500, Some("application/json"))));
        assert!(!looks_live(&resp(503, None)));
    }

    #[test]
    fn test_html_is_never_live() {
        assert!(!looks_live(&resp(200, Some("text/html"))));
        assert!(!looks_live(&resp(200, Some("text/html; charset=utf-8"))));
        assert!(!looks_live(&resp(401, Some("text/html"))));
        assert!(looks_live(&resp(200, Some("text/plain"))));
    }
}
