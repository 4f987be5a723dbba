// src/pipeline.rs
// One request through rate check, sanitize, prompt, model call, normalize

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::VibeConfig;
use crate::error::{Result, VibeError};
use crate::llm::{AnalysisClient, OpenAiAnalysisClient};
use crate::prompt::PromptBuilder;
use crate::rate_limit::RateLimiter;
use crate::report::{MockFallbackProvider, VibeReport, normalize};
use crate::sanitize::InputSanitizer;

/// Inbound analysis call. Lives for one request only.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub raw_text: String,
    pub client_key: String,
}

impl AnalysisRequest {
    pub fn new(raw_text: impl Into<String>, client_key: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            client_key: client_key.into(),
        }
    }
}

/// Where a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    Live,
    Mock,
}

impl ReportSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Mock => "mock",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: VibeReport,
    pub source: ReportSource,
}

/// The request-handling pipeline. Built once at startup and shared.
///
/// Only rate-limit and validation failures reach the caller; upstream and
/// parse problems degrade to the mock or to per-field defaults.
pub struct VibePipeline {
    limiter: Arc<RateLimiter>,
    rate_limit: u32,
    sanitizer: InputSanitizer,
    prompt_builder: PromptBuilder,
    client: Option<Arc<dyn AnalysisClient>>,
    fallback: MockFallbackProvider,
}

impl VibePipeline {
    pub fn new(
        limiter: Arc<RateLimiter>,
        rate_limit: u32,
        sanitizer: InputSanitizer,
        client: Option<Arc<dyn AnalysisClient>>,
    ) -> Self {
        Self {
            limiter,
            rate_limit,
            sanitizer,
            prompt_builder: PromptBuilder::new(),
            client,
            fallback: MockFallbackProvider::new(),
        }
    }

    /// Wire up the pipeline from config. No credential means mock mode.
    pub fn from_config(config: &VibeConfig) -> Result<Self> {
        let client: Option<Arc<dyn AnalysisClient>> = if config.has_llm() {
            Some(Arc::new(OpenAiAnalysisClient::from_config(config)?))
        } else {
            None
        };

        Ok(Self::new(
            Arc::new(RateLimiter::from_config(config)),
            config.rate_limit,
            InputSanitizer::from_config(config),
            client,
        ))
    }

    pub fn is_live(&self) -> bool {
        self.client.is_some()
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<Analysis> {
        // Malformed requests are rejected before they can spend quota
        if request.raw_text.trim().is_empty() {
            return Err(VibeError::validation(
                "Missing or invalid `text` in request body",
            ));
        }

        if let Err(e) = self.limiter.check(self.rate_limit, &request.client_key) {
            warn!(client_key = %request.client_key, "Rate limit exceeded");
            return Err(e);
        }

        let text = self.sanitizer.sanitize(&request.raw_text);
        debug!(
            input_chars = request.raw_text.chars().count(),
            sanitized_chars = text.chars().count(),
            max_chars = self.sanitizer.max_chars(),
            "Input sanitized"
        );

        let Some(client) = &self.client else {
            debug!("No upstream client configured, returning mock report");
            return Ok(self.mock());
        };

        let prompt = self.prompt_builder.build(&text);
        match client.call(&prompt).await {
            Ok(raw) => {
                info!(model = client.model(), "Model response received");
                Ok(Analysis {
                    report: normalize(raw.as_str()),
                    source: ReportSource::Live,
                })
            }
            Err(e) => {
                warn!(error = %e, "Upstream call failed, returning mock report");
                Ok(self.mock())
            }
        }
    }

    fn mock(&self) -> Analysis {
        Analysis {
            report: self.fallback.provide(),
            source: ReportSource::Mock,
        }
    }
}
