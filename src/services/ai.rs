use std::env;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::core::lib::{ChatProvider, ChatReply, ChatRequest, Usage, WrenError, WrenResult};

pub const API_KEY_VARS: &[&str] = &["GROK_API_KEY", "XAI_API_KEY"];

pub const SYSTEM_PROMPT: &str = "You are a command-line assistant that runs system commands and searches the web on the user's behalf.
You can run these commands: ipconfig, ping, tracert, netstat, systeminfo, ver, hostname, whoami, dir, type, echo, date, time.
You can search the web through DuckDuckGo.

When the user asks something:
1. Prefer a command that answers the question and tell them which one to ask for.
2. Suggest a web search when no command can provide the information.
3. Answer directly only when neither helps.

Never suggest destructive commands. Keep answers short and explain what a command does before recommending it.";

/// First API key found in the environment.
pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

/// Client for OpenAI-compatible chat completion endpoints (xAI by default).
#[derive(Debug)]
pub struct GrokClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl GrokClient {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> WrenResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WrenError::AIProcessingError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, api_url: api_url.into(), api_key })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait::async_trait]
impl ChatProvider for GrokClient {
    async fn complete(&self, request: &ChatRequest) -> WrenResult<ChatReply> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            WrenError::AIProcessingError(format!(
                "No API key configured. Set {} to enable chat.",
                API_KEY_VARS.join(" or ")
            ))
        })?;

        debug!(model = %request.model, messages = request.messages.len(), "sending chat request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    WrenError::AIProcessingError(format!("Could not reach the chat service at {}", self.api_url))
                } else if e.is_timeout() {
                    WrenError::AIProcessingError("The chat service timed out. Please try again.".to_string())
                } else {
                    WrenError::AIProcessingError(format!("Failed to connect to AI service: {}", e))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WrenError::AIProcessingError(format!("Failed to read AI response: {}", e)))?;

        parse_completion(status, &text, &request.model)
    }
}

/// Interprets a chat completion response body.
pub fn parse_completion(status: StatusCode, body: &str, model: &str) -> WrenResult<ChatReply> {
    let json: Value = serde_json::from_str(body).map_err(|_| {
        WrenError::AIProcessingError(format!("Unexpected response from AI service ({}): {}", status, body.trim()))
    })?;

    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.as_str())
            .unwrap_or("Unknown error");
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                WrenError::AIProcessingError(format!("The API key was rejected: {}", message))
            }
            StatusCode::NOT_FOUND => WrenError::AIProcessingError(format!("Model '{}' not found: {}", model, message)),
            _ => WrenError::AIProcessingError(format!("AI service error: {}", message)),
        });
    }

    if !status.is_success() {
        return Err(WrenError::AIProcessingError(format!("AI service returned {}", status)));
    }

    let content = json
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| WrenError::AIProcessingError("No response received from the model.".to_string()))?;

    let usage = json
        .get("usage")
        .and_then(|usage| serde_json::from_value::<Usage>(usage.clone()).ok())
        .unwrap_or_default();

    Ok(ChatReply { content: content.to_string(), usage })
}
