//! Minimal Google Gemini API client.
//!
//! This crate provides a focused client for Gemini's `generateContent` API:
//! - Multi-turn content with the `user` / `model` role vocabulary
//! - System instructions and generation configuration
//! - Typed finish reasons and prompt-feedback block reasons

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Gemini {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a Gemini client from the GEMINI_API_KEY environment variable.
    ///
    /// Honors GEMINI_MODEL as a model override when set.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| Error::NoApiKey)?;
        let mut client = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            client.model = model;
        }
        Ok(client)
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send a generation request and return the full response.
    pub async fn generate(&self, request: Request) -> Result<Response, Error> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let api_request = build_api_request(&request);
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(format!("{API_BASE}/models/{model}:generateContent"))
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: extract_api_error(&body),
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(parse_response(api_response))
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A generation request to send to Gemini.
#[derive(Debug, Clone)]
pub struct Request {
    pub model: Option<String>,
    pub contents: Vec<Content>,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<usize>,
}

impl Request {
    /// Create a new request with the given conversation contents.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            model: None,
            contents,
            system: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

/// One turn of conversation content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user turn with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Create a model turn with a single text part.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Text of the first text-bearing part, if any.
    pub fn text(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| p.text.as_deref())
    }
}

/// The role of a content turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// A part of a content turn. Non-text parts deserialize with `text: None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    pub text: Option<String>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// A generation response from Gemini.
#[derive(Debug, Clone)]
pub struct Response {
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage: Option<Usage>,
}

impl Response {
    /// Quick accessor for the first candidate's first text part.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|p| p.text.as_deref())
    }

    /// Whether the prompt itself was rejected upstream.
    pub fn prompt_blocked(&self) -> bool {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason)
            .is_some()
    }
}

/// One generated candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<FinishReason>,
}

/// Why the model stopped generating a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Other,
}

/// Feedback on the prompt itself.
#[derive(Debug, Clone)]
pub struct PromptFeedback {
    pub block_reason: Option<BlockReason>,
}

/// Why a prompt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Safety,
    Blocklist,
    ProhibitedContent,
    Other,
}

/// Token usage information.
#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub candidates_tokens: usize,
    pub total_tokens: usize,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    prompt_feedback: Option<ApiPromptFeedback>,
    usage_metadata: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    content: Option<ApiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn build_api_request(request: &Request) -> ApiRequest {
    let contents = request.contents.iter().map(content_to_api).collect();

    let system_instruction = request.system.as_ref().map(|text| ApiContent {
        role: None,
        parts: vec![ApiPart {
            text: Some(text.clone()),
        }],
    });

    let generation_config = if request.temperature.is_some() || request.max_output_tokens.is_some()
    {
        Some(ApiGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        })
    } else {
        None
    };

    ApiRequest {
        contents,
        system_instruction,
        generation_config,
    }
}

fn content_to_api(content: &Content) -> ApiContent {
    ApiContent {
        role: Some(
            match content.role {
                Role::User => "user",
                Role::Model => "model",
            }
            .to_string(),
        ),
        parts: content
            .parts
            .iter()
            .map(|p| ApiPart {
                text: p.text.clone(),
            })
            .collect(),
    }
}

fn parse_response(api_response: ApiResponse) -> Response {
    let candidates = api_response
        .candidates
        .into_iter()
        .map(|c| Candidate {
            content: c.content.map(content_from_api),
            finish_reason: c.finish_reason.as_deref().map(|r| match r {
                "STOP" => FinishReason::Stop,
                "MAX_TOKENS" => FinishReason::MaxTokens,
                "SAFETY" => FinishReason::Safety,
                "RECITATION" => FinishReason::Recitation,
                _ => FinishReason::Other,
            }),
        })
        .collect();

    let prompt_feedback = api_response.prompt_feedback.map(|f| PromptFeedback {
        block_reason: f.block_reason.as_deref().map(|r| match r {
            "SAFETY" => BlockReason::Safety,
            "BLOCKLIST" => BlockReason::Blocklist,
            "PROHIBITED_CONTENT" => BlockReason::ProhibitedContent,
            _ => BlockReason::Other,
        }),
    });

    let usage = api_response.usage_metadata.map(|u| Usage {
        prompt_tokens: u.prompt_token_count,
        candidates_tokens: u.candidates_token_count,
        total_tokens: u.total_token_count,
    });

    Response {
        candidates,
        prompt_feedback,
        usage,
    }
}

fn content_from_api(content: ApiContent) -> Content {
    Content {
        // The API omits the role on some degenerate candidates; those are
        // model turns by construction.
        role: match content.role.as_deref() {
            Some("user") => Role::User,
            _ => Role::Model,
        },
        parts: content
            .parts
            .into_iter()
            .map(|p| Part { text: p.text })
            .collect(),
    }
}

/// Pull the human-readable message out of a Gemini error body, falling back
/// to the raw body when it is not the standard error envelope.
fn extract_api_error(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.to_string(),
    }
}
