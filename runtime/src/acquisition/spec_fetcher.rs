//! OpenAPI / Swagger document discovery at well-known paths.

use super::http_client::HttpClient;
use crate::endpoint::join_url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Well-known specification locations, tried in order.
pub const SPEC_CANDIDATES: [&str; 3] = ["/openapi.json", "/swagger.json", "/api/openapi.json"];

/// A raw structured API specification.
///
/// Key order is preserved exactly as served, so iteration over `paths` and
/// each method table follows the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecDocument(Value);

impl SpecDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The underlying JSON document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The `paths` table, if the document has one.
    pub fn paths(&self) -> Option<&serde_json::Map<String, Value>> {
        self.0.get("paths").and_then(Value::as_object)
    }

    /// `info.title`, when declared.
    pub fn title(&self) -> Option<&str> {
        self.0
            .get("info")
            .and_then(|i| i.get("title"))
            .and_then(Value::as_str)
    }
}

/// Try each well-known location and return the first document that looks like a spec.
///
/// A candidate is accepted only on status 200 with the literal `"openapi"` in
/// the raw body; errors on one candidate move on to the next.
pub async fn fetch_spec(base_url: &str, client: &HttpClient, timeout_ms: u64) -> Option<SpecDocument> {
    for path in SPEC_CANDIDATES {
        let url = join_url(base_url, path);

        let resp = match client.get(&url, timeout_ms).await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("spec candidate {url} failed: {e}");
                continue;
            }
        };

        if resp.status != 200 || !resp.body.contains("openapi") {
            debug!("spec candidate {url} rejected (status {})", resp.status);
            continue;
        }

        match serde_json::from_str::<Value>(&resp.body) {
            Ok(value) => {
                info!("specification found at {url}");
                return Some(SpecDocument::new(value));
            }
            Err(e) => debug!("spec candidate {url} is not JSON: {e}"),
        }
    }

    None
}
