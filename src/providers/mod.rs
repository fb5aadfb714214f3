pub mod chain;
pub mod exchangerate_host;
pub mod frankfurter;
#[cfg(test)]
pub(crate) mod mock;
pub mod open_er_api;
pub mod util;

use crate::core::config::ProvidersConfig;
use chain::ProviderChain;
use std::sync::Arc;

/// Builds the standard chain: exchangerate.host, then open.er-api.com, then
/// Frankfurter.
pub fn default_chain(config: &ProvidersConfig) -> ProviderChain {
    ProviderChain::new(
        Arc::new(exchangerate_host::ExchangerateHostProvider::new(
            &config.exchangerate_host.base_url,
        )),
        Arc::new(open_er_api::OpenErApiProvider::new(
            &config.open_er_api.base_url,
        )),
        Arc::new(frankfurter::FrankfurterProvider::new(
            &config.frankfurter.base_url,
        )),
    )
}
