//! HTTP client for the wiki definition service.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use acrotip_protocols::error::SourceError;
use acrotip_protocols::{Definition, DefinitionSource};

use crate::api::ApiDefinition;
use crate::parser::parse_word_page;

const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Primary definition source backed by a wiki glossary service.
pub struct WikiSource {
    base_url: String,
    token: Option<String>,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl WikiSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            client: reqwest::Client::new(),
        }
    }

    /// Send a bearer token with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Per-request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, term: &str) -> Result<reqwest::Response, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .get(&url)
            .query(&[("word", term)])
            .timeout(Duration::from_millis(self.timeout_ms));
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout_ms)
            } else {
                SourceError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthenticated(format!("status {}", status.as_u16())));
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl DefinitionSource for WikiSource {
    fn id(&self) -> &str {
        "wiki"
    }

    async fn detailed(&self, term: &str) -> Result<Vec<Definition>, SourceError> {
        let body = self
            .get("/api/definitions", term)
            .await?
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        let entries: Vec<ApiDefinition> =
            serde_json::from_str(&body).map_err(|e| SourceError::Malformed(e.to_string()))?;
        debug!("Wiki returned {} detailed definitions for {}", entries.len(), term);
        Ok(entries.into_iter().map(Definition::from).collect())
    }

    async fn simple(&self, term: &str) -> Result<Vec<String>, SourceError> {
        let html = self
            .get("/word/", term)
            .await?
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        let definitions = parse_word_page(&html, term);
        debug!("Parsed {} definitions from word page for {}", definitions.len(), term);
        Ok(definitions)
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
