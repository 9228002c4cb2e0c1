//! Endpoint descriptors shared by every discovery stage.

use crate::error::InspectorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Summary attached to endpoints found by the HTML documentation scan.
pub const HTML_FALLBACK_NOTE: &str = "Found via HTML fallback";

/// Summary attached to endpoints found by the common-path probe.
pub const JSON_PROBE_NOTE: &str = "Detected via JSON probe";

/// HTTP method of a discovered endpoint.
///
/// Heuristic stages only ever produce the five named verbs. `Other` keeps
/// whatever a structured specification declares beyond them (`HEAD`,
/// `OPTIONS`, ...) so extraction stays one descriptor per table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Other(String),
}

impl HttpMethod {
    /// Upper-case wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Other(name) => name,
        }
    }

    /// Upper-case any method name, mapping the five known verbs onto their variants.
    pub fn from_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        match upper.as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            _ => Self::Other(upper),
        }
    }

    /// Convert into a `reqwest` method for live requests.
    pub fn to_reqwest(&self) -> Result<reqwest::Method, InspectorError> {
        reqwest::Method::from_bytes(self.as_str().as_bytes())
            .map_err(|_| InspectorError::InvalidMethod(self.as_str().to_string()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse: only the five verbs a user may pick for a live test.
impl FromStr for HttpMethod {
    type Err = InspectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_name(s) {
            Self::Other(_) => Err(InspectorError::InvalidMethod(s.to_string())),
            known => Ok(known),
        }
    }
}

impl From<String> for HttpMethod {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<HttpMethod> for String {
    fn from(m: HttpMethod) -> Self {
        m.as_str().to_string()
    }
}

/// A normalized `(method, path, summary)` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// HTTP method, `GET` when undetermined.
    pub method: HttpMethod,
    /// URL path beginning with `/`.
    pub path: String,
    /// Free-text description. Heuristic stages use a fixed provenance note.
    #[serde(default)]
    pub summary: String,
}

impl EndpointDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            summary: summary.into(),
        }
    }

    /// `METHOD path - summary`, surrounding whitespace trimmed.
    ///
    /// The separator is kept with an empty summary (`GET /x -`).
    pub fn one_line(&self) -> String {
        format!("{} {} - {}", self.method, self.path, self.summary)
            .trim()
            .to_string()
    }
}

/// Join a base URL and an endpoint path, trimming trailing slashes from the base.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
