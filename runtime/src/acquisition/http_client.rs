//! Async HTTP client wrapping reqwest.
//!
//! Plain HTTP requests, no browser. Every call carries its own timeout and
//! is issued exactly once; stages decide what a failure means.

use anyhow::Result;
use std::time::Duration;

/// Response captured from a single HTTP request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers (selected subset unless noted).
    pub headers: Vec<(String, String)>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// First header with the given (lower-case) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `Content-Type` header, empty when missing.
    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or("")
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

/// Everything needed to send one arbitrary request.
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub json_body: Option<serde_json::Value>,
}

/// HTTP client shared by the discovery stages.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a new HTTP client with the inspector's user-agent.
    pub fn new(timeout_ms: u64) -> Self {
        let ua = concat!("api-inspector/", env!("CARGO_PKG_VERSION"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(ua)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Perform a single GET request.
    pub async fn get(&self, url: &str, timeout_ms: u64) -> Result<HttpResponse> {
        self.request(reqwest::Method::GET, url, timeout_ms).await
    }

    /// Perform a single body-less request with an arbitrary method.
    pub async fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        timeout_ms: u64,
    ) -> Result<HttpResponse> {
        let r = self
            .client
            .request(method, url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await?;

        let status = r.status().as_u16();
        let final_url = r.url().to_string();

        let headers: Vec<(String, String)> = r
            .headers()
            .iter()
            .filter(|(k, _)| {
                matches!(
                    k.as_str(),
                    "content-type" | "content-length" | "location" | "www-authenticate"
                )
            })
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = r.text().await.unwrap_or_default();

        Ok(HttpResponse {
            final_url,
            status,
            headers,
            body,
        })
    }

    /// Send a fully specified request and return a response with all headers.
    ///
    /// Unlike `get()`, this captures *all* response headers, because the
    /// live tester shows them to the user.
    pub async fn send(&self, spec: &RequestSpec, timeout_ms: u64) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(spec.method.clone(), &spec.url)
            .timeout(Duration::from_millis(timeout_ms));

        for (name, value) in &spec.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }
        if let Some(body) = &spec.json_body {
            builder = builder.json(body);
        }

        let r = builder.send().await?;
        let status = r.status().as_u16();
        let final_url = r.url().to_string();

        let headers: Vec<(String, String)> = r
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = r.text().await.unwrap_or_default();

        Ok(HttpResponse {
            final_url,
            status,
            headers,
            body,
        })
    }
}
