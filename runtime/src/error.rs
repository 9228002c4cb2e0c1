//! Typed errors surfaced to callers.
//!
//! Discovery stages never return these: network, parse and render failures
//! inside a stage are logged and reduce to "no result from this candidate".
//! These variants cover the operations whose failures a caller must see.

/// All errors surfaced by the inspector's public operations.
#[derive(thiserror::Error, Debug)]
pub enum InspectorError {
    #[error("Invalid JSON in {field}: {source}")]
    InvalidJson {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected a JSON object for {0}")]
    NotAnObject(&'static str),

    #[error("Unsupported HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Summarizer error: {0}")]
    Summarizer(String),
}

/// Result alias for inspector operations.
pub type InspectorResult<T> = Result<T, InspectorError>;

/// Validate that `base_url` is an absolute http(s) URL.
pub fn validate_base_url(base_url: &str) -> InspectorResult<url::Url> {
    let parsed = url::Url::parse(base_url.trim()).map_err(|e| InspectorError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(InspectorError::InvalidUrl {
            url: base_url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("http://127.0.0.1:8000").is_ok());
        assert!(validate_base_url("https://api.example.com/v1/").is_ok());
        assert!(matches!(
            validate_base_url("ftp://example.com"),
            Err(InspectorError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_base_url("not a url"),
            Err(InspectorError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_invalid_json_message_names_field() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = InspectorError::InvalidJson {
            field: "request body",
            source,
        };
        assert!(err.to_string().starts_with("Invalid JSON in request body"));
    }
}
