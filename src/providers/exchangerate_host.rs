use super::util::{check_base_rate, get_json};
use crate::core::currency::{RateProvider, RateSnapshot};
use crate::core::error::{FxResult, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

const NAME: &str = "exchangerate.host";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: Option<HashMap<String, f64>>,
    date: Option<String>,
}

/// exchangerate.host `latest` endpoint. Rates are relative to the requested
/// base and the response does not echo the base back.
pub struct ExchangerateHostProvider {
    base_url: String,
}

impl ExchangerateHostProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn to_snapshot(base: &str, response: LatestResponse) -> FxResult<RateSnapshot> {
    let rates = response
        .rates
        .filter(|r| !r.is_empty())
        .ok_or(ProviderError::Malformed {
            provider: NAME,
            reason: "missing rates".to_string(),
        })?;
    check_base_rate(NAME, base, &rates)?;
    Ok(RateSnapshot::new(base, rates, response.date))
}

#[async_trait]
impl RateProvider for ExchangerateHostProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "ExchangerateHostFetch", skip(self), fields(base = %base))]
    async fn fetch_quote(&self, base: &str) -> FxResult<RateSnapshot> {
        let url = format!("{}/latest?base={}", self.base_url, base);
        let response: LatestResponse = get_json(NAME, &url).await?;
        to_snapshot(base, response)
    }
}
