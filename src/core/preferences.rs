//! Persisted user preferences: the base currency and the last rate snapshot.

use crate::core::cache::KeyValueCollection;
use crate::core::currency::{CurrencyDescriptor, RateSnapshot, find_currency};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub const PREFERENCES_COLLECTION: &str = "preferences";
const BASE_CURRENCY_KEY: &[u8] = b"globalCurrency";
const RATES_KEY: &[u8] = b"fxRates";

#[derive(Deserialize)]
struct StoredCurrency {
    code: String,
}

#[derive(Clone)]
pub struct Preferences {
    collection: Arc<dyn KeyValueCollection>,
}

impl Preferences {
    pub fn new(collection: Arc<dyn KeyValueCollection>) -> Self {
        Self { collection }
    }

    /// Returns the stored base currency if it is still in the catalog.
    pub async fn base_currency(&self) -> Option<&'static CurrencyDescriptor> {
        let raw = self.collection.get(BASE_CURRENCY_KEY).await?;
        match serde_json::from_slice::<StoredCurrency>(&raw) {
            Ok(stored) => {
                let found = find_currency(&stored.code);
                if found.is_none() {
                    warn!("Ignoring stored base currency {}", stored.code);
                }
                found
            }
            Err(e) => {
                warn!("Discarding unreadable base currency preference: {}", e);
                None
            }
        }
    }

    pub async fn save_base_currency(&self, currency: &CurrencyDescriptor) {
        match serde_json::to_vec(currency) {
            Ok(blob) => self.collection.put(BASE_CURRENCY_KEY, &blob).await,
            Err(e) => warn!("Failed to serialize base currency: {}", e),
        }
    }

    /// Loads the persisted snapshot. A corrupt blob is removed and treated as
    /// absent.
    pub async fn rate_snapshot(&self) -> Option<RateSnapshot> {
        let raw = self.collection.get(RATES_KEY).await?;
        match serde_json::from_slice::<RateSnapshot>(&raw) {
            Ok(snapshot) => {
                debug!("Restored {} rate snapshot", snapshot.base);
                Some(snapshot)
            }
            Err(e) => {
                warn!("Discarding unreadable rate snapshot: {}", e);
                self.collection.remove(RATES_KEY).await;
                None
            }
        }
    }

    pub async fn save_rate_snapshot(&self, snapshot: &RateSnapshot) {
        match serde_json::to_vec(snapshot) {
            Ok(blob) => self.collection.put(RATES_KEY, &blob).await,
            Err(e) => warn!("Failed to serialize rate snapshot: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCollection;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_base_currency_round_trip() {
        let prefs = Preferences::new(Arc::new(MemoryCollection::new()));
        assert!(prefs.base_currency().await.is_none());

        prefs.save_base_currency(find_currency("EUR").unwrap()).await;
        assert_eq!(prefs.base_currency().await.map(|c| c.code), Some("EUR"));
    }

    #[tokio::test]
    async fn test_unknown_stored_currency_is_ignored() {
        let collection = Arc::new(MemoryCollection::new());
        collection
            .put(
                BASE_CURRENCY_KEY,
                br#"{"code":"JPY","locale":"ja-JP","symbol":"Y"}"#,
            )
            .await;
        let prefs = Preferences::new(collection);
        assert!(prefs.base_currency().await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let prefs = Preferences::new(Arc::new(MemoryCollection::new()));
        let snapshot = RateSnapshot::new(
            "GEL",
            HashMap::from([("USD".to_string(), 0.37)]),
            Some("2026-10-17".to_string()),
        );
        prefs.save_rate_snapshot(&snapshot).await;
        assert_eq!(prefs.rate_snapshot().await, Some(snapshot));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_removed() {
        let collection = Arc::new(MemoryCollection::new());
        collection.put(RATES_KEY, b"not json").await;

        let prefs = Preferences::new(collection.clone());
        assert!(prefs.rate_snapshot().await.is_none());
        assert!(collection.get(RATES_KEY).await.is_none());
    }
}
