/// LLM Client — the single point of entry for all scoring-service calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Prompt construction and reply parsing live in `analysis`; this module
/// only moves text across the wire.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all scoring calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
/// Replies are one short JSON object; no need for a large completion window.
const MAX_TOKENS: u32 = 1000;
/// Low temperature keeps replies close to the structured shape the prompt asks for.
const TEMPERATURE: f32 = 0.3;
/// Upper bound on one call. A hung upstream call must not stall a batch
/// beyond this. Retry policy, if any, belongs to callers, not this client.
const CALL_TIMEOUT_SECS: u64 = 120;

/// Failure modes of one scoring call. Callers decide whether a failure is
/// recorded as data (batch mode) or propagated (single-pair mode).
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("scoring service returned no text content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The single LLM client used for resume scoring.
/// One request per call: no retries, bounded timeout, typed failures.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(CALL_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Makes a raw call to the scoring service, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, ScoringError> {
        let api_key = self.api_key.as_deref().ok_or(ScoringError::MissingApiKey)?;

        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ScoringError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "Scoring call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }

    /// Convenience method that calls the service and returns the reply text.
    /// The reply is natural language that should, but is not guaranteed to,
    /// contain one JSON object — decoding it is the caller's concern.
    pub async fn call_text(&self, prompt: &str, system: &str) -> Result<String, ScoringError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(ScoringError::EmptyContent)?;
        Ok(text.to_string())
    }
}
