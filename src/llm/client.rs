// src/llm/client.rs
// Single-shot chat completions client for the analysis prompt

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{Span, debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::VibeConfig;
use crate::error::{UpstreamError, VibeError};
use crate::prompt::PromptPayload;

use super::wire::{ChatMessage, ChatRequest, parse_chat_content};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest slice of an error body kept for logs and errors
const MAX_ERROR_BODY: usize = 500;

/// Opaque model output. May or may not be JSON, may carry code fences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelResponse(pub String);

impl RawModelResponse {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Anything that can turn a prompt into raw model text.
///
/// Implementations make exactly one attempt; the pipeline owns fallback.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn call(&self, prompt: &PromptPayload) -> Result<RawModelResponse, UpstreamError>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

/// OpenAI-compatible chat completions client with a fixed model and temperature
pub struct OpenAiAnalysisClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiAnalysisClient {
    /// Fails only when the HTTP client cannot be built (e.g. no TLS backend)
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, VibeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| VibeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url,
            model,
            temperature,
            client,
        })
    }

    /// Build from config; fails when no credential is configured
    pub fn from_config(config: &VibeConfig) -> Result<Self, VibeError> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| VibeError::Config("OPENAI_API_KEY is not set".to_string()))?;

        Self::new(
            api_key,
            config.openai_base_url.clone(),
            config.model.clone(),
            config.temperature,
            config.upstream_timeout(),
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl AnalysisClient for OpenAiAnalysisClient {
    #[instrument(skip(self, prompt), fields(request_id, model = %self.model))]
    async fn call(&self, prompt: &PromptPayload) -> Result<RawModelResponse, UpstreamError> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();
        Span::current().record("request_id", request_id.as_str());

        let request = ChatRequest::new(
            &self.model,
            vec![
                ChatMessage::system(&prompt.system),
                ChatMessage::user(&prompt.user),
            ],
            self.temperature,
        );
        debug!(
            request_id = %request_id,
            prompt_len = prompt.user.len(),
            "Starting chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(request_id = %request_id, status = %status, "Chat completion request failed");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = response.text().await?;
        let content = parse_chat_content(&body)?;

        info!(
            request_id = %request_id,
            duration_ms = start_time.elapsed().as_millis() as u64,
            content_len = content.len(),
            "Chat completion finished"
        );

        Ok(RawModelResponse(content))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
