//! Process-wide exchange rate state.
//!
//! [`FxContext`] owns the current base currency and the cached
//! [`RateSnapshot`], decides when the snapshot is stale, refreshes it in the
//! background and answers conversion requests against whatever data it holds.
//!
//! Refreshes are last-completed-wins: every successful refresh replaces the
//! snapshot, whatever base it was for. Concurrent refreshes for the same base
//! share a single in-flight request.

use crate::core::convert;
use crate::core::currency::{CurrencyDescriptor, RateSnapshot, default_currency, find_currency};
use crate::core::format::{format_money, format_raw};
use crate::core::preferences::Preferences;
use crate::providers::chain::ProviderChain;
use anyhow::{Result, anyhow};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Completes with the committed snapshot, or `None` if every provider failed.
pub type RefreshHandle = Shared<BoxFuture<'static, Option<RateSnapshot>>>;

/// Holds at most one snapshot and decides whether it can be trusted.
#[derive(Debug, Default, Clone)]
pub struct RateCache {
    snapshot: Option<RateSnapshot>,
}

impl RateCache {
    pub fn new(snapshot: Option<RateSnapshot>) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> Option<&RateSnapshot> {
        self.snapshot.as_ref()
    }

    /// Stale when there is nothing usable or the data is for another base.
    /// There is no time-based expiry.
    pub fn is_stale(&self, base: &str) -> bool {
        match &self.snapshot {
            Some(snapshot) => !snapshot.has_rates() || snapshot.base != base,
            None => true,
        }
    }

    /// Replaces the held snapshot wholesale.
    pub fn commit(&mut self, snapshot: RateSnapshot) {
        self.snapshot = Some(snapshot);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatesFreshness {
    pub base: &'static str,
    pub snapshot_base: Option<String>,
    pub as_of: Option<String>,
    pub rate_count: usize,
    pub stale: bool,
}

/// Conversion service owned by the application root.
#[derive(Clone)]
pub struct FxContext {
    chain: Arc<ProviderChain>,
    preferences: Preferences,
    base: Arc<watch::Sender<&'static CurrencyDescriptor>>,
    cache: Arc<RwLock<RateCache>>,
    in_flight: Arc<Mutex<HashMap<String, RefreshHandle>>>,
    /// Serializes commit and persist so disk always holds what memory holds.
    commit_lock: Arc<tokio::sync::Mutex<()>>,
}

impl FxContext {
    /// Restores the persisted base currency and snapshot.
    ///
    /// `default_base` is used when no base currency has been saved yet; it
    /// falls back to the catalog default when unknown.
    pub async fn init(preferences: Preferences, chain: ProviderChain, default_base: &str) -> Self {
        let base = match preferences.base_currency().await {
            Some(base) => base,
            None => find_currency(default_base).unwrap_or_else(|| {
                warn!("Unknown default currency {}, using {}", default_base, default_currency().code);
                default_currency()
            }),
        };
        let snapshot = preferences.rate_snapshot().await;
        debug!(
            "Initialised rates context with base {} and {} snapshot",
            base.code,
            snapshot.as_ref().map_or("no", |s| s.base.as_str())
        );

        let (base_tx, _) = watch::channel(base);
        Self {
            chain: Arc::new(chain),
            preferences,
            base: Arc::new(base_tx),
            cache: Arc::new(RwLock::new(RateCache::new(snapshot))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            commit_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn base_currency(&self) -> &'static CurrencyDescriptor {
        *self.base.borrow()
    }

    /// Notifies on every base currency change.
    pub fn subscribe(&self) -> watch::Receiver<&'static CurrencyDescriptor> {
        self.base.subscribe()
    }

    /// Switches the base currency, persists it and kicks off a refresh when
    /// the cached rates no longer match.
    pub async fn set_base_currency(&self, code: &str) -> Result<Option<RefreshHandle>> {
        let currency = find_currency(code).ok_or_else(|| anyhow!("Unsupported currency: {code}"))?;
        self.base.send_replace(currency);
        self.preferences.save_base_currency(currency).await;
        info!("Base currency set to {}", currency.code);
        Ok(self.ensure_fresh())
    }

    pub fn snapshot(&self) -> Option<RateSnapshot> {
        self.read_cache().snapshot().cloned()
    }

    pub fn is_stale(&self) -> bool {
        self.read_cache().is_stale(self.base_currency().code)
    }

    pub fn rates_freshness(&self) -> RatesFreshness {
        let base = self.base_currency().code;
        let cache = self.read_cache();
        let snapshot = cache.snapshot();
        RatesFreshness {
            base,
            snapshot_base: snapshot.map(|s| s.base.clone()),
            as_of: snapshot.and_then(|s| s.as_of.clone()),
            rate_count: snapshot.map_or(0, |s| s.rates.len()),
            stale: cache.is_stale(base),
        }
    }

    /// Starts a background refresh if the cache is stale.
    ///
    /// Returns immediately. The handle may be awaited to observe the outcome
    /// but nothing requires it; dropping it does not cancel the refresh.
    pub fn ensure_fresh(&self) -> Option<RefreshHandle> {
        if !self.is_stale() {
            return None;
        }
        Some(self.refresh_in_background(self.base_currency().code))
    }

    fn refresh_in_background(&self, base: &'static str) -> RefreshHandle {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = in_flight.get(base) {
            debug!("Joining in-flight refresh for {}", base);
            return handle.clone();
        }

        let ctx = self.clone();
        let task = tokio::spawn(async move {
            let result = ctx.refresh(base).await;
            ctx.in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(base);
            result
        });
        let handle = async move { task.await.ok().flatten() }.boxed().shared();
        in_flight.insert(base.to_string(), handle.clone());
        handle
    }

    /// Resolves rates for `base` and commits them. Failures leave the cache
    /// exactly as it was.
    async fn refresh(&self, base: &str) -> Option<RateSnapshot> {
        match self.chain.resolve(base).await {
            Ok(snapshot) => {
                let _guard = self.commit_lock.lock().await;
                self.write_cache().commit(snapshot.clone());
                self.preferences.save_rate_snapshot(&snapshot).await;
                info!("Committed {} rate snapshot", snapshot.base);
                Some(snapshot)
            }
            Err(e) => {
                warn!("Keeping cached rates: {}", e);
                None
            }
        }
    }

    /// Converts with the cached snapshot; `to` defaults to the base currency.
    pub fn convert(&self, amount: f64, from: &str, to: Option<&str>) -> f64 {
        let to = to.unwrap_or(self.base_currency().code);
        convert::convert(amount, from, to, self.read_cache().snapshot())
    }

    /// Converts into the base currency and formats with its locale.
    pub fn format(&self, amount: f64, from: Option<&str>) -> String {
        let base = self.base_currency();
        let converted = self.convert(amount, from.unwrap_or(base.code), Some(base.code));
        format_money(converted, base)
    }

    pub fn format_raw(&self, amount: f64, code: &str) -> String {
        format_raw(amount, code)
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, RateCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, RateCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockRateProvider;
    use crate::store::memory::MemoryCollection;
    use std::time::Duration;

    fn gel_snapshot() -> RateSnapshot {
        RateSnapshot::new("GEL", HashMap::from([("USD".to_string(), 0.37)]), None)
    }

    async fn context_with(
        providers: [Arc<MockRateProvider>; 3],
        persisted: Option<RateSnapshot>,
    ) -> (FxContext, Preferences) {
        let preferences = Preferences::new(Arc::new(MemoryCollection::new()));
        if let Some(snapshot) = persisted {
            preferences.save_rate_snapshot(&snapshot).await;
        }
        let [a, b, c] = providers;
        let chain = ProviderChain::new(a, b, c);
        let ctx = FxContext::init(preferences.clone(), chain, "GEL").await;
        (ctx, preferences)
    }

    fn failing() -> [Arc<MockRateProvider>; 3] {
        [
            Arc::new(MockRateProvider::new("a")),
            Arc::new(MockRateProvider::new("b")),
            Arc::new(MockRateProvider::new("c")),
        ]
    }

    #[test]
    fn test_rate_cache_staleness() {
        let mut cache = RateCache::default();
        assert!(cache.is_stale("GEL"));

        cache.commit(RateSnapshot {
            base: "GEL".to_string(),
            rates: HashMap::new(),
            as_of: None,
        });
        assert!(cache.is_stale("GEL"));

        cache.commit(gel_snapshot());
        assert!(!cache.is_stale("GEL"));
        assert!(cache.is_stale("USD"));
    }

    #[tokio::test]
    async fn test_restores_persisted_snapshot() {
        let (ctx, _) = context_with(failing(), Some(gel_snapshot())).await;
        assert_eq!(ctx.base_currency().code, "GEL");
        assert_eq!(ctx.snapshot(), Some(gel_snapshot()));
        assert!(!ctx.is_stale());
        assert!(ctx.ensure_fresh().is_none());
    }

    #[tokio::test]
    async fn test_base_change_forces_staleness() {
        let (ctx, prefs) = context_with(failing(), Some(gel_snapshot())).await;
        let mut changes = ctx.subscribe();

        let handle = ctx.set_base_currency("usd").await.unwrap();
        assert!(ctx.is_stale());
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().code, "USD");
        assert_eq!(prefs.base_currency().await.map(|c| c.code), Some("USD"));

        // Every provider fails, so the GEL snapshot survives
        assert!(handle.unwrap().await.is_none());
        assert_eq!(ctx.snapshot(), Some(gel_snapshot()));
    }

    #[tokio::test]
    async fn test_unknown_base_currency_is_rejected() {
        let (ctx, _) = context_with(failing(), None).await;
        assert!(ctx.set_base_currency("JPY").await.is_err());
        assert_eq!(ctx.base_currency().code, "GEL");
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_cache_unchanged() {
        let (ctx, prefs) = context_with(failing(), Some(gel_snapshot())).await;
        ctx.set_base_currency("EUR").await.unwrap().unwrap().await;

        assert_eq!(ctx.snapshot(), Some(gel_snapshot()));
        assert_eq!(prefs.rate_snapshot().await, Some(gel_snapshot()));
        assert!(ctx.is_stale());
    }

    #[tokio::test]
    async fn test_refresh_commits_and_persists() {
        let a = Arc::new(
            MockRateProvider::new("a").with_quote("GEL", &[("USD", 0.37), ("EUR", 0.34)]),
        );
        let (ctx, prefs) = context_with(
            [a, Arc::new(MockRateProvider::new("b")), Arc::new(MockRateProvider::new("c"))],
            None,
        )
        .await;
        assert!(ctx.is_stale());
        assert_eq!(ctx.convert(100.0, "USD", None), 100.0);

        let committed = ctx.ensure_fresh().unwrap().await.unwrap();
        assert_eq!(committed.base, "GEL");
        assert!(!ctx.is_stale());
        assert_eq!(prefs.rate_snapshot().await, Some(committed));
        assert!((ctx.convert(37.0, "USD", None) - 100.0).abs() < 1e-9);
        assert!((ctx.convert(37.0, "USD", Some("EUR")) - 34.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_share_one_request() {
        let a = Arc::new(
            MockRateProvider::new("a")
                .with_quote("GEL", &[("USD", 0.37)])
                .with_delay(Duration::from_millis(50)),
        );
        let (ctx, _) = context_with(
            [
                a.clone(),
                Arc::new(MockRateProvider::new("b")),
                Arc::new(MockRateProvider::new("c")),
            ],
            None,
        )
        .await;

        let first = ctx.ensure_fresh().unwrap();
        let second = ctx.ensure_fresh().unwrap();
        let (first, second) = tokio::join!(first, second);
        assert_eq!(first, second);
        assert_eq!(a.calls(), vec!["GEL"]);

        // Once committed there is nothing left to do
        assert!(ctx.ensure_fresh().is_none());
    }

    #[tokio::test]
    async fn test_format_uses_base_currency() {
        let (ctx, _) = context_with(failing(), Some(gel_snapshot())).await;
        assert_eq!(ctx.format(37.0, Some("USD")), "100,00\u{a0}₾");
        assert_eq!(ctx.format(5.0, None), "5,00\u{a0}₾");
        assert_eq!(ctx.format_raw(5.0, "USD"), "$5.00");

        let freshness = ctx.rates_freshness();
        assert_eq!(freshness.base, "GEL");
        assert_eq!(freshness.snapshot_base.as_deref(), Some("GEL"));
        assert_eq!(freshness.rate_count, 2);
        assert!(!freshness.stale);
    }

    #[tokio::test]
    async fn test_last_completed_refresh_wins_across_bases() {
        // GEL is requested first but answers last
        let a = Arc::new(
            MockRateProvider::new("a")
                .with_quote("GEL", &[("USD", 0.37)])
                .with_quote("USD", &[("GEL", 2.7)])
                .with_base_delay("GEL", Duration::from_millis(150))
                .with_base_delay("USD", Duration::from_millis(10)),
        );
        let (ctx, prefs) = context_with(
            [
                a.clone(),
                Arc::new(MockRateProvider::new("b")),
                Arc::new(MockRateProvider::new("c")),
            ],
            None,
        )
        .await;

        let gel = ctx.ensure_fresh().unwrap();
        let usd = ctx.set_base_currency("USD").await.unwrap().unwrap();
        let (gel, usd) = tokio::join!(gel, usd);
        let gel = gel.unwrap();
        assert_eq!(usd.map(|s| s.base), Some("USD".to_string()));
        assert_eq!(gel.base, "GEL");

        assert_eq!(ctx.snapshot(), Some(gel.clone()));
        assert_eq!(prefs.rate_snapshot().await, Some(gel));
        // The base is USD, so the GEL data is stale again
        assert!(ctx.is_stale());
        assert_eq!(a.calls().len(), 2);
    }
}
