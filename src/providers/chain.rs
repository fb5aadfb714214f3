//! Ordered provider fallback with USD pivot derivation.

use crate::core::convert::derive_from_usd;
use crate::core::currency::{PIVOT_CODE, RateProvider, RateSnapshot};
use crate::core::error::{FxError, FxResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

enum Strategy {
    Direct(Arc<dyn RateProvider>),
    ViaUsd(Arc<dyn RateProvider>),
}

impl Strategy {
    async fn attempt(&self, base: &str) -> FxResult<RateSnapshot> {
        match self {
            Strategy::Direct(provider) => provider.fetch_quote(base).await,
            Strategy::ViaUsd(provider) => {
                let usd = provider.fetch_quote(PIVOT_CODE).await?;
                derive_from_usd(base, &usd)
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Strategy::Direct(provider) => provider.name().to_string(),
            Strategy::ViaUsd(provider) => format!("{} via {PIVOT_CODE}", provider.name()),
        }
    }
}

/// Resolves a snapshot for a base by walking the strategies in order:
///
/// 1. primary, direct
/// 2. secondary, direct
/// 3. secondary for USD, derived
/// 4. fallback, direct
/// 5. fallback for USD, derived
pub struct ProviderChain {
    strategies: Vec<Strategy>,
}

impl ProviderChain {
    pub fn new(
        primary: Arc<dyn RateProvider>,
        secondary: Arc<dyn RateProvider>,
        fallback: Arc<dyn RateProvider>,
    ) -> Self {
        Self {
            strategies: vec![
                Strategy::Direct(primary),
                Strategy::Direct(Arc::clone(&secondary)),
                Strategy::ViaUsd(secondary),
                Strategy::Direct(Arc::clone(&fallback)),
                Strategy::ViaUsd(fallback),
            ],
        }
    }

    pub async fn resolve(&self, base: &str) -> FxResult<RateSnapshot> {
        for strategy in &self.strategies {
            match strategy.attempt(base).await {
                Ok(snapshot) => {
                    info!(
                        "Resolved {} rates from {} ({} currencies)",
                        base,
                        strategy.describe(),
                        snapshot.rates.len()
                    );
                    return Ok(snapshot);
                }
                Err(e) => warn!("Rate strategy {} failed for {}: {}", strategy.describe(), base, e),
            }
        }
        debug!("All rate strategies failed for {}", base);
        Err(FxError::AllProvidersExhausted {
            base: base.to_string(),
        })
    }
}
