//! User preferences in the sync storage area.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use acrotip_protocols::{get_value, set_value, KeyValueStore, StorageError};

pub const AI_API_KEY: &str = "aiApiKey";
pub const DISABLED_SITES_KEY: &str = "disabledSites";
pub const TOOLTIP_DELAY_KEY: &str = "tooltipDelay";

/// Typed access to the preference keys. Reads never fail: unreadable
/// storage is logged and reads as unset.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored AI credential, if any non-blank one is set.
    pub async fn credential(&self) -> Option<String> {
        self.read::<String>(AI_API_KEY)
            .await
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Store the credential, or remove it with `None`.
    pub async fn set_credential(&self, key: Option<&str>) -> Result<(), StorageError> {
        match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => {
                set_value(self.store.as_ref(), AI_API_KEY, key).await?;
                info!("AI credential saved");
            }
            None => {
                self.store.remove(&[AI_API_KEY]).await?;
                info!("AI credential removed");
            }
        }
        Ok(())
    }

    /// Hostnames the engine is turned off for, sorted.
    pub async fn disabled_sites(&self) -> Vec<String> {
        self.read::<Vec<String>>(DISABLED_SITES_KEY)
            .await
            .unwrap_or_default()
    }

    pub async fn is_site_disabled(&self, host: &str) -> bool {
        let host = host.trim().to_lowercase();
        self.disabled_sites()
            .await
            .iter()
            .any(|site| site.eq_ignore_ascii_case(&host))
    }

    /// Turn the engine on or off for `host`. Read-modify-write on the list.
    pub async fn set_site_enabled(&self, host: &str, enabled: bool) -> Result<(), StorageError> {
        let host = host.trim().to_lowercase();
        let current: Vec<String> = get_value(self.store.as_ref(), DISABLED_SITES_KEY)
            .await?
            .unwrap_or_default();
        let mut sites: BTreeSet<String> = current.into_iter().collect();
        if enabled {
            sites.remove(&host);
        } else {
            sites.insert(host.clone());
        }
        let list: Vec<String> = sites.into_iter().collect();
        set_value(self.store.as_ref(), DISABLED_SITES_KEY, &list).await?;
        info!("Site {} {}", host, if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Show delay override in milliseconds.
    pub async fn tooltip_delay(&self) -> Option<u64> {
        self.read(TOOLTIP_DELAY_KEY).await
    }

    pub async fn set_tooltip_delay(&self, delay_ms: u64) -> Result<(), StorageError> {
        set_value(self.store.as_ref(), TOOLTIP_DELAY_KEY, &delay_ms).await
    }

    async fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match get_value(self.store.as_ref(), key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read preference {}: {}", key, e);
                None
            }
        }
    }
}
