//! Endpoint summarization through an external text-generation service.
//!
//! Discovery never depends on this module: a `Summarizer` takes the final
//! endpoint list and returns markdown, and can be swapped freely.

use crate::config::SummarizerSettings;
use crate::endpoint::EndpointDescriptor;
use crate::error::{InspectorError, InspectorResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are an assistant for backend developers. \
Given API endpoints (method + path + brief summary), produce concise, \
developer-friendly documentation:\n\
• Purpose\n• Key params (if obvious)\n• Example request body (if applicable)\n\
Return clean Markdown with headings per endpoint.";

/// Turns a list of endpoints into descriptive markdown.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, endpoints: &[EndpointDescriptor]) -> InspectorResult<String>;
}

/// The user message sent along with the system prompt.
pub fn build_user_prompt(endpoints: &[EndpointDescriptor]) -> String {
    let joined = endpoints
        .iter()
        .map(EndpointDescriptor::one_line)
        .collect::<Vec<_>>()
        .join("\n");
    format!("Endpoints:\n{joined}\n\nIf info is missing, keep output minimal without guessing.")
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsSummarizer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl ChatCompletionsSummarizer {
    /// Build from settings; `None` when no API key is configured.
    pub fn from_settings(settings: &SummarizerSettings) -> Option<Self> {
        let api_key = settings.api_key.clone()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .unwrap_or_default();
        Some(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Summarizer for ChatCompletionsSummarizer {
    async fn summarize(&self, endpoints: &[EndpointDescriptor]) -> InspectorResult<String> {
        let user_prompt = build_user_prompt(endpoints);
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InspectorError::Summarizer(format!(
                "status {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| InspectorError::Summarizer("response contained no text".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn endpoints() -> Vec<EndpointDescriptor> {
        vec![
            EndpointDescriptor::new(HttpMethod::Get, "/hello", "say hello"),
            EndpointDescriptor::new(HttpMethod::Post, "/items", ""),
        ]
    }

    fn settings(base_url: &str) -> SummarizerSettings {
        SummarizerSettings {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            api_key: Some("sk-test".to_string()),
            timeout_ms: 5_000,
        }
    }

    #[test]
    fn test_user_prompt_lists_endpoints() {
        let prompt = build_user_prompt(&endpoints());
        assert!(prompt.starts_with("Endpoints:\nGET /hello - say hello\nPOST /items -\n"));
        assert!(prompt.ends_with("keep output minimal without guessing."));
    }

    #[test]
    fn test_no_key_no_summarizer() {
        let mut s = settings("http://unused.test");
        s.api_key = None;
        assert!(ChatCompletionsSummarizer::from_settings(&s).is_none());
    }

    #[tokio::test]
    async fn test_summarize_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(serde_json::json!({"model": "test-model", "temperature": 0.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "## GET /hello\nGreets.\n"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let summarizer = ChatCompletionsSummarizer::from_settings(&settings(&server.uri())).unwrap();
        let md = summarizer.summarize(&endpoints()).await.unwrap();
        assert_eq!(md, "## GET /hello\nGreets.");
    }

    #[tokio::test]
    async fn test_summarize_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let summarizer = ChatCompletionsSummarizer::from_settings(&settings(&server.uri())).unwrap();
        let err = summarizer.summarize(&endpoints()).await.unwrap_err();
        assert!(matches!(err, InspectorError::Summarizer(msg) if msg.contains("401")));
    }
}
