//! Live test requests against a single endpoint.
//!
//! User-typed JSON is validated before anything is sent; malformed input is
//! returned to the caller and never reaches the network.

use crate::acquisition::http_client::{HttpClient, RequestSpec};
use crate::acquisition::spec_extractor::{example_query_params, example_request_body};
use crate::acquisition::spec_fetcher::SpecDocument;
use crate::endpoint::{join_url, HttpMethod};
use crate::error::{InspectorError, InspectorResult};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

/// A fully validated test request.
#[derive(Debug, Clone)]
pub struct TryRequest {
    pub base_url: String,
    pub method: HttpMethod,
    pub path: String,
    pub bearer_token: Option<String>,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

/// What came back from a test request.
#[derive(Debug, Clone, Serialize)]
pub struct TryResult {
    pub url: String,
    pub status: u16,
    pub elapsed_ms: u64,
    pub content_type: String,
    pub headers: Vec<(String, String)>,
    /// Parsed body when it is JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    pub body: String,
}

/// Parse a user-typed JSON body. Blank input means "no body".
pub fn parse_json_body(raw: &str) -> InspectorResult<Option<Value>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|source| InspectorError::InvalidJson {
            field: "request body",
            source,
        })
}

/// Parse user-typed query parameters given as a JSON object.
///
/// String values are sent verbatim; other scalars and nested values are sent
/// as their JSON text. Blank input means "no parameters".
pub fn parse_query_params(raw: &str) -> InspectorResult<Vec<(String, String)>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(raw).map_err(|source| InspectorError::InvalidJson {
        field: "query parameters",
        source,
    })?;
    query_pairs(&value)
}

fn query_pairs(value: &Value) -> InspectorResult<Vec<(String, String)>> {
    let Some(obj) = value.as_object() else {
        return Err(InspectorError::NotAnObject("query parameters"));
    };
    Ok(obj
        .iter()
        .map(|(k, v)| {
            let rendered = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), rendered)
        })
        .collect())
}

/// Example body and query parameters the specification declares for an endpoint.
pub fn prefill(
    spec: Option<&SpecDocument>,
    path: &str,
    method: &HttpMethod,
) -> (Option<Value>, Option<Value>) {
    match spec {
        Some(spec) => (
            example_request_body(spec, path, method.as_str()),
            example_query_params(spec, path, method.as_str()),
        ),
        None => (None, None),
    }
}

impl TryRequest {
    /// Validate user input into a request.
    ///
    /// When `body_raw` / `query_raw` are `None`, the specification's examples
    /// (if any) are used instead.
    pub fn build(
        base_url: &str,
        method: &str,
        path: &str,
        bearer_token: Option<&str>,
        body_raw: Option<&str>,
        query_raw: Option<&str>,
        spec: Option<&SpecDocument>,
    ) -> InspectorResult<Self> {
        crate::error::validate_base_url(base_url)?;
        let method: HttpMethod = method.parse()?;
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let (example_body, example_query) = prefill(spec, &path, &method);

        let body = match body_raw {
            Some(raw) => parse_json_body(raw)?,
            None => example_body,
        };
        let query = match (query_raw, example_query) {
            (Some(raw), _) => parse_query_params(raw)?,
            (None, Some(example)) => query_pairs(&example)?,
            (None, None) => Vec::new(),
        };

        Ok(Self {
            base_url: base_url.trim().to_string(),
            method,
            path,
            bearer_token: bearer_token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            body,
            query,
        })
    }

    fn to_spec(&self) -> InspectorResult<RequestSpec> {
        let mut headers = Vec::new();
        if let Some(token) = &self.bearer_token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        // GET requests carry no body.
        let json_body = match self.method {
            HttpMethod::Get => {
                if self.body.is_some() {
                    debug!("ignoring request body for GET {}", self.path);
                }
                None
            }
            _ => self.body.clone(),
        };

        Ok(RequestSpec {
            method: self.method.to_reqwest()?,
            url: join_url(&self.base_url, &self.path),
            headers,
            query: self.query.clone(),
            json_body,
        })
    }
}

/// Send one test request and capture the response.
pub async fn send(client: &HttpClient, request: &TryRequest, timeout_ms: u64) -> Result<TryResult> {
    let spec = request.to_spec()?;
    let start = Instant::now();
    let resp = client.send(&spec, timeout_ms).await?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    Ok(TryResult {
        url: resp.final_url.clone(),
        status: resp.status,
        elapsed_ms,
        content_type: resp.content_type().to_string(),
        json: resp.json().ok(),
        headers: resp.headers,
        body: resp.body,
    })
}
