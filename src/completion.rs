use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::prompt::PromptPayload;

/// Why a completion request produced no reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// Network unreachable, DNS or TLS failure.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("completion endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Success status, but no usable reply text.
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Transport(_) => "transport",
            CompletionError::Http { .. } => "http",
            CompletionError::MalformedResponse(_) => "malformed_response",
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CompletionError::MalformedResponse(e.to_string())
        } else {
            CompletionError::Transport(e.to_string())
        }
    }
}

/// Boundary to the remote model. One network request per `send`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn send(&self, payload: &PromptPayload) -> Result<String, CompletionError>;
}

fn non_empty_reply(text: &str) -> Result<String, CompletionError> {
    let text = text.trim();
    if text.is_empty() {
        Err(CompletionError::MalformedResponse("empty reply".to_string()))
    } else {
        Ok(text.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CompletionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    error!(%status, %error_body, "Completion API request failed");
    Err(CompletionError::Http {
        status: status.as_u16(),
        body: error_body,
    })
}

// OpenAI-style /chat/completions (OpenRouter and compatible gateways)

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    title: String,
    referer: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            title: "IrshadAI".to_string(),
            referer: None,
        }
    }

    /// Attribution headers some gateways use for app rankings.
    pub fn with_attribution(mut self, title: impl Into<String>, referer: Option<String>) -> Self {
        self.title = title.into();
        self.referer = referer;
        self
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn send(&self, payload: &PromptPayload) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_payload = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &payload.system,
                },
                ChatMessage {
                    role: "user",
                    content: &payload.user,
                },
            ],
        };

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Title", &self.title)
            .json(&request_payload);
        if let Some(referer) = &self.referer {
            request = request.header("HTTP-Referer", referer);
        }

        let response = check_status(request.send().await?).await?;
        let chat_response = response.json::<ChatResponse>().await?;
        debug!(choices = chat_response.choices.len(), "Received chat completion");

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::MalformedResponse("no choices returned".to_string()))?;
        non_empty_reply(&content)
    }
}

// Ollama /api/generate

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool, // We want the full response, not a stream
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn send(&self, payload: &PromptPayload) -> Result<String, CompletionError> {
        let ollama_api_url = format!("{}/api/generate", self.base_url);
        let request_payload = OllamaRequest {
            model: &self.model,
            prompt: payload.flatten(),
            stream: false,
        };

        let response = self
            .client
            .post(&ollama_api_url)
            .json(&request_payload)
            .send()
            .await?;
        let response = check_status(response).await?;
        let ollama_response = response.json::<OllamaResponse>().await?;

        debug!(response = ?ollama_response.response, "Received Ollama response");
        non_empty_reply(&ollama_response.response)
    }
}

// Plain-text GET endpoints that take the prompt as the last path segment

/// Characters left bare in a prompt segment, the same set a browser's
/// `encodeURIComponent` keeps. Newlines and tabs are always escaped.
const PROMPT_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone)]
pub struct PromptQueryClient {
    client: Client,
    base_url: Url,
}

impl PromptQueryClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("{base_url} cannot take a prompt path segment");
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn url_for(&self, prompt: &str) -> Url {
        let encoded = utf8_percent_encode(prompt, PROMPT_SEGMENT);
        let mut url = self.base_url.clone();
        let path = format!("{}/{}", url.path().trim_end_matches('/'), encoded);
        url.set_path(&path);
        url
    }
}

#[async_trait]
impl CompletionClient for PromptQueryClient {
    #[instrument(skip_all, fields(host = self.base_url.host_str().unwrap_or_default()))]
    async fn send(&self, payload: &PromptPayload) -> Result<String, CompletionError> {
        let url = self.url_for(&payload.flatten());
        debug!(url_len = url.as_str().len(), "Sending prompt query");

        let response = check_status(self.client.get(url).send().await?).await?;
        let body = response.text().await?;
        non_empty_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url_encodes_prompt() {
        let client = PromptQueryClient::new("https://text.example.com/").unwrap();
        let url = client.url_for("what is wudu?\n\nاشرح");
        assert!(url.as_str().starts_with("https://text.example.com/what%20is%20wudu%3F%0A%0A"));
        assert_eq!(url.path_segments().unwrap().count(), 1);
    }

    #[test]
    fn test_query_keeps_line_structure() {
        let client = PromptQueryClient::new("https://text.example.com").unwrap();
        let url = client.url_for("User: a/b\tc\nAI: (ok)");
        assert_eq!(
            url.as_str(),
            "https://text.example.com/User%3A%20a%2Fb%09c%0AAI%3A%20(ok)"
        );
    }

    #[test]
    fn test_query_keeps_base_path() {
        let client = PromptQueryClient::new("https://example.com/api/text").unwrap();
        let url = client.url_for("hi");
        assert_eq!(url.as_str(), "https://example.com/api/text/hi");
    }

    #[test]
    fn test_query_rejects_non_base_url() {
        assert!(PromptQueryClient::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_empty_reply_is_malformed() {
        assert_eq!(
            non_empty_reply("  \n"),
            Err(CompletionError::MalformedResponse("empty reply".to_string()))
        );
        assert_eq!(non_empty_reply(" ok ").unwrap(), "ok");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CompletionError::Transport("x".into()).kind(), "transport");
        assert_eq!(
            CompletionError::Http {
                status: 500,
                body: String::new()
            }
            .kind(),
            "http"
        );
        assert_eq!(
            CompletionError::MalformedResponse("x".into()).kind(),
            "malformed_response"
        );
    }
}
