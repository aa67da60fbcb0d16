// Claude API streaming client using reqwest-eventsource.
//
// Sends one scouting prompt to the Anthropic Messages API with
// `stream: true`, accumulates the streamed text, and returns the complete
// report. Failures surface as typed errors; the engine's state is never
// involved and the caller decides whether anything is worth retrying.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report generation not configured: set anthropic_api_key in config/credentials.toml")]
    NotConfigured,

    #[error("report service returned status {0}")]
    Api(reqwest::StatusCode),

    #[error("network error: {0}")]
    Transport(String),

    #[error("stream ended without any content")]
    EmptyStream,
}

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Low-level Claude API streaming client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, temperature: f64) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            max_tokens,
            temperature,
        }
    }

    /// Send one message and return the accumulated streamed response text.
    pub async fn generate(&self, system: &str, user_content: &str) -> Result<String, ReportError> {
        if self.api_key.is_empty() {
            return Err(ReportError::NotConfigured);
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let request = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let es = request.eventsource().map_err(|e| {
            ReportError::Transport(format!("failed to create event source: {e}"))
        })?;

        consume_stream(es).await
    }
}

/// Drain an SSE stream of Messages API events into the full response text.
pub(crate) async fn consume_stream(mut es: EventSource) -> Result<String, ReportError> {
    let mut full_text = String::new();
    let mut input_tokens: u32 = 0;
    let mut output_tokens: u32 = 0;

    while let Some(event) = es.next().await {
        match event {
            Ok(Event::Open) => {
                debug!("SSE connection opened");
            }
            Ok(Event::Message(msg)) => match msg.event.as_str() {
                "message_start" => match parse_input_tokens(&msg.data) {
                    Some(n) => input_tokens = n,
                    None => warn!("failed to parse input_tokens from message_start"),
                },
                "content_block_delta" => {
                    if let Some(text) = parse_delta_text(&msg.data) {
                        full_text.push_str(&text);
                    }
                }
                "message_delta" => match parse_output_tokens(&msg.data) {
                    Some(n) => output_tokens = n,
                    None => warn!("failed to parse output_tokens from message_delta"),
                },
                "message_stop" => {
                    es.close();
                    debug!(input_tokens, output_tokens, "streaming complete");
                    if full_text.is_empty() {
                        return Err(ReportError::EmptyStream);
                    }
                    return Ok(full_text);
                }
                // Ignore ping, content_block_start, content_block_stop, etc.
                event_type => {
                    debug!(event_type, "ignoring SSE event");
                }
            },
            Err(err) => {
                warn!(?err, "SSE stream error");
                es.close();
                return Err(classify_stream_error(err));
            }
        }
    }

    // Stream ended without message_stop (shouldn't normally happen).
    if full_text.is_empty() {
        Err(ReportError::EmptyStream)
    } else {
        Ok(full_text)
    }
}

fn classify_stream_error(err: reqwest_eventsource::Error) -> ReportError {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            ReportError::Api(status)
        }
        reqwest_eventsource::Error::Transport(e) => ReportError::Transport(e.to_string()),
        other => ReportError::Transport(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// ScoutClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that is either a live Claude client or disabled.
pub enum ScoutClient {
    /// Claude API is configured and ready.
    Active(ClaudeClient),
    /// Report generation is disabled (no API key configured).
    Disabled,
}

impl ScoutClient {
    /// Build a `ScoutClient` from the application config.
    ///
    /// Returns `Active` when an API key is present in credentials, otherwise
    /// `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => ScoutClient::Active(ClaudeClient::new(
                key.clone(),
                config.llm.model.clone(),
                config.llm.max_tokens,
                config.llm.temperature,
            )),
            _ => ScoutClient::Disabled,
        }
    }

    /// Generate a report, delegating to the inner `ClaudeClient` or failing
    /// immediately when disabled.
    pub async fn generate(&self, system: &str, user_content: &str) -> Result<String, ReportError> {
        match self {
            ScoutClient::Active(client) => client.generate(system, user_content).await,
            ScoutClient::Disabled => Err(ReportError::NotConfigured),
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// Extract `input_tokens` from a `message_start` event's JSON.
///
/// Expected shape: `{ "type": "message_start", "message": { "usage": { "input_tokens": N } } }`
pub(crate) fn parse_input_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("message")?
        .get("usage")?
        .get("input_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// Extract `delta.text` from a `content_block_delta` event's JSON.
///
/// Expected shape: `{ "type": "content_block_delta", "delta": { "type": "text_delta", "text": "..." } }`
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract `output_tokens` from a `message_delta` event's JSON.
///
/// Expected shape: `{ "type": "message_delta", "usage": { "output_tokens": N } }`
pub(crate) fn parse_output_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("usage")?
        .get("output_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
