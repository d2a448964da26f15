//! Service wiring for the acrotip binary.

use std::sync::Arc;

use tracing::{info, warn};

use acrotip_cache::{CacheTtl, TieredCache};
use acrotip_config::Config;
use acrotip_lookup::{BackgroundService, LookupOrchestrator, LookupSettings, Preferences, RecentLookups};
use acrotip_protocols::{KeyValueStore, MessageBus, MessageSender, StorageArea};
use acrotip_provider_openai::OpenAiProvider;
use acrotip_source_wiki::WikiSource;
use acrotip_storage_sqlite::SqliteStore;

/// Background service running on this process, reachable over the bus.
pub(crate) struct App {
    pub config: Config,
    pub sync: Arc<dyn KeyValueStore>,
    pub preferences: Preferences,
    pub sender: MessageSender,
}

impl App {
    pub async fn start(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let store = open_store(&config).await?;
        let sync: Arc<dyn KeyValueStore> = Arc::new(store.for_area(StorageArea::Sync));
        let local: Arc<dyn KeyValueStore> = Arc::new(store);

        let cache = TieredCache::new(local.clone())
            .with_ttl(CacheTtl::from_hours(
                config.cache.primary_ttl_hours,
                config.cache.ai_ttl_hours,
                config.cache.token_ttl_hours,
            ))
            .with_memory_tier(config.cache.memory_tier);
        let preferences = Preferences::new(sync.clone());

        let mut wiki = WikiSource::new(config.primary.base_url.clone())
            .with_timeout_ms(config.primary.timeout_ms);
        if let Some(token) = &config.primary.token {
            wiki = wiki.with_token(token.clone());
        }
        let provider = OpenAiProvider::with_base_url(&config.ai.base_url);

        let orchestrator = LookupOrchestrator::new(Arc::new(cache), preferences.clone())
            .with_source(Arc::new(wiki))
            .with_provider(Arc::new(provider))
            .with_settings(LookupSettings::from_config(&config));
        let service = BackgroundService::new(Arc::new(orchestrator), RecentLookups::new(local));

        let (sender, receiver) = MessageBus::channel(32);
        tokio::spawn(receiver.serve(Arc::new(service)));
        info!("Lookup service ready (wiki: {})", config.primary.base_url);

        Ok(Self {
            config,
            sync,
            preferences,
            sender,
        })
    }
}

async fn open_store(config: &Config) -> Result<SqliteStore, Box<dyn std::error::Error>> {
    match config.storage.resolved_path() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            info!("Using storage at {}", path.display());
            Ok(SqliteStore::open(&path).await?)
        }
        None => {
            warn!("No data directory available, storage will not persist");
            Ok(SqliteStore::open_in_memory().await?)
        }
    }
}
