//! OpenAI-compatible provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use acrotip_protocols::error::ProviderError;
use acrotip_protocols::provider::{CompletionProvider, CompletionRequest};

use crate::api::{error_message, ApiMessage, ApiRequest, ApiResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Chat completions client for OpenAI and compatible gateways.
pub struct OpenAiProvider {
    api_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create provider against a custom base URL (for OpenAI-compatible APIs).
    pub fn with_base_url(base_url: impl AsRef<str>) -> Self {
        Self {
            api_url: format!("{}/chat/completions", base_url.as_ref().trim_end_matches('/')),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn build_request(&self, request: &CompletionRequest) -> ApiRequest {
        let mut messages = Vec::with_capacity(2);
        if !request.system.is_empty() {
            messages.push(ApiMessage::system(&request.system));
        }
        messages.push(ApiMessage::user(&request.prompt));

        ApiRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send_request(
        &self,
        credential: &str,
        api_request: &ApiRequest,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", credential))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let message = error_message(&response.text().await.unwrap_or_default());

        Err(match status.as_u16() {
            401 | 403 => ProviderError::AuthenticationFailed(message),
            429 => ProviderError::RateLimited {
                retry_after_seconds: retry_after.unwrap_or(0),
            },
            400 => ProviderError::InvalidRequest(message),
            status => ProviderError::ApiError { status, message },
        })
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn id(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        credential: &str,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        let api_request = self.build_request(&request);
        let response = self.send_request(credential, &api_request).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let text = api_response
            .first_text()
            .ok_or(ProviderError::EmptyCompletion)?;
        debug!("Completion from {} ({} chars)", request.model, text.len());
        Ok(text.to_string())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
