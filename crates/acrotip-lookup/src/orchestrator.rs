//! Two-tier definition lookup.
//!
//! Resolution order for a normalized term:
//!
//! 1. primary cache, then the primary source under a timeout (detailed
//!    query first, simple query only when the detailed one errors);
//! 2. AI cache, then the completion provider, but only when a credential is
//!    available.
//!
//! Any failure inside a tier means "no result from that tier". Concurrent
//! calls for the same term share a single in-flight resolution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use acrotip_cache::{cache_key, CacheCategory, TieredCache};
use acrotip_config::Config;
use acrotip_protocols::{
    normalize_term, CompletionProvider, Definition, DefinitionSource, LookupResult, PageContext,
};

use crate::preferences::Preferences;
use crate::prompt::definition_request;

/// Tunables for the orchestrator.
#[derive(Debug, Clone)]
pub struct LookupSettings {
    /// Upper bound on one primary-source resolution.
    pub primary_timeout: Duration,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Credential used when none is stored in preferences.
    pub fallback_credential: Option<String>,
}

impl LookupSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            primary_timeout: Duration::from_millis(config.primary.timeout_ms),
            model: config.ai.model.clone(),
            max_tokens: config.ai.max_tokens,
            temperature: config.ai.temperature,
            fallback_credential: config.ai.api_key.clone(),
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

type InFlight = Shared<BoxFuture<'static, LookupResult>>;

#[derive(Clone)]
struct Tiers {
    cache: Arc<TieredCache>,
    source: Option<Arc<dyn DefinitionSource>>,
    provider: Option<Arc<dyn CompletionProvider>>,
    preferences: Preferences,
    settings: LookupSettings,
}

pub struct LookupOrchestrator {
    tiers: Arc<Tiers>,
    in_flight: Arc<Mutex<HashMap<String, InFlight>>>,
}

impl LookupOrchestrator {
    pub fn new(cache: Arc<TieredCache>, preferences: Preferences) -> Self {
        Self {
            tiers: Arc::new(Tiers {
                cache,
                source: None,
                provider: None,
                preferences,
                settings: LookupSettings::default(),
            }),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn DefinitionSource>) -> Self {
        self.tiers_mut().source = Some(source);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.tiers_mut().provider = Some(provider);
        self
    }

    pub fn with_settings(mut self, settings: LookupSettings) -> Self {
        self.tiers_mut().settings = settings;
        self
    }

    fn tiers_mut(&mut self) -> &mut Tiers {
        Arc::make_mut(&mut self.tiers)
    }

    pub fn cache(&self) -> &Arc<TieredCache> {
        &self.tiers.cache
    }

    /// Number of resolutions currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Resolve `term`. Never fails; the result's source says which tier
    /// answered, `none` when neither did.
    pub async fn resolve(&self, term: &str, context: &PageContext) -> LookupResult {
        let term = normalize_term(term);
        if term.is_empty() {
            return LookupResult::none(term);
        }

        let shared = {
            let mut in_flight = self.in_flight.lock();
            if let Some(existing) = in_flight.get(&term) {
                debug!("Joining in-flight lookup for {}", term);
                existing.clone()
            } else {
                let tiers = self.tiers.clone();
                let registry = self.in_flight.clone();
                let key = term.clone();
                let context = context.clone();
                let fut = async move {
                    let result = tiers.resolve(&key, &context).await;
                    registry.lock().remove(&key);
                    result
                }
                .boxed()
                .shared();
                in_flight.insert(term.clone(), fut.clone());
                fut
            }
        };
        shared.await
    }
}

impl Tiers {
    async fn resolve(&self, term: &str, context: &PageContext) -> LookupResult {
        if let Some(definitions) = self.lookup_primary(term).await {
            info!("Resolved {} from primary source ({} definitions)", term, definitions.len());
            return LookupResult::primary(term, definitions);
        }
        if let Some(text) = self.lookup_ai(term, context).await {
            info!("Resolved {} from AI provider", term);
            return LookupResult::ai(term, text);
        }
        info!("No definition found for {}", term);
        LookupResult::none(term)
    }

    async fn lookup_primary(&self, term: &str) -> Option<Vec<Definition>> {
        let key = cache_key(CacheCategory::Primary, term);
        if let Some(cached) = self.cache.get(&key).await {
            match serde_json::from_value::<Vec<Definition>>(cached) {
                Ok(definitions) if !definitions.is_empty() => {
                    debug!("Primary cache hit for {}", term);
                    return Some(definitions);
                }
                Ok(_) => {}
                Err(e) => debug!("Ignoring unreadable primary cache entry for {}: {}", term, e),
            }
        }

        let source = self.source.as_ref()?;
        let definitions =
            match tokio::time::timeout(self.settings.primary_timeout, fetch_primary(source.as_ref(), term))
                .await
            {
                Ok(definitions) => definitions,
                Err(_) => {
                    warn!(
                        "Primary source {} timed out after {:?} for {}",
                        source.id(),
                        self.settings.primary_timeout,
                        term
                    );
                    return None;
                }
            };
        if definitions.is_empty() {
            return None;
        }

        match serde_json::to_value(&definitions) {
            Ok(value) => self.cache.set(&key, value, CacheCategory::Primary).await,
            Err(e) => warn!("Failed to encode definitions for {}: {}", term, e),
        }
        Some(definitions)
    }

    async fn lookup_ai(&self, term: &str, context: &PageContext) -> Option<String> {
        let key = cache_key(CacheCategory::Ai, term);
        if let Some(Value::String(cached)) = self.cache.get(&key).await {
            if !cached.trim().is_empty() {
                debug!("AI cache hit for {}", term);
                return Some(cached);
            }
        }

        let provider = self.provider.as_ref()?;
        let Some(credential) = self.credential().await else {
            debug!("No AI credential configured, skipping AI tier for {}", term);
            return None;
        };

        let request = definition_request(
            &self.settings.model,
            self.settings.max_tokens,
            self.settings.temperature,
            term,
            context,
        );
        let text = match provider.complete(&credential, request).await {
            Ok(text) => text.trim().to_string(),
            Err(e) if e.is_credential_rejected() => {
                warn!("AI key rejected while looking up {}: {}", term, e);
                return None;
            }
            Err(e) => {
                warn!("AI lookup for {} failed: {}", term, e);
                return None;
            }
        };
        if text.is_empty() {
            return None;
        }

        self.cache
            .set(&key, Value::String(text.clone()), CacheCategory::Ai)
            .await;
        Some(text)
    }

    async fn credential(&self) -> Option<String> {
        if let Some(stored) = self.preferences.credential().await {
            return Some(stored);
        }
        self.settings
            .fallback_credential
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

/// Query the source, preferring the detailed shape. Errors read as empty.
async fn fetch_primary(source: &dyn DefinitionSource, term: &str) -> Vec<Definition> {
    let mut definitions = match source.detailed(term).await {
        Ok(definitions) => definitions,
        Err(e) => {
            debug!("Detailed query for {} failed ({}), trying simple query", term, e);
            match source.simple(term).await {
                Ok(texts) => texts.into_iter().map(Definition::plain).collect(),
                Err(e) => {
                    warn!("Primary source {} failed for {}: {}", source.id(), term, e);
                    Vec::new()
                }
            }
        }
    };
    definitions.retain(|d| !d.text.trim().is_empty());
    // Stable, so unvoted results keep source order.
    definitions.sort_by(|a, b| b.upvote_count.cmp(&a.upvote_count));
    definitions
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
