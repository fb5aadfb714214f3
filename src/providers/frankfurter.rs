use super::util::get_json;
use crate::core::currency::{RateProvider, RateSnapshot};
use crate::core::error::{FxResult, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

const NAME: &str = "frankfurter.app";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    base: Option<String>,
    date: Option<String>,
    rates: Option<HashMap<String, f64>>,
}

/// Frankfurter (ECB reference rates) `latest` endpoint.
pub struct FrankfurterProvider {
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn to_snapshot(requested: &str, response: LatestResponse) -> FxResult<RateSnapshot> {
    let mut rates = response
        .rates
        .filter(|r| !r.is_empty())
        .ok_or(ProviderError::Malformed {
            provider: NAME,
            reason: "missing rates".to_string(),
        })?;
    let base = response.base.unwrap_or_else(|| requested.to_string());
    // The table never lists the base itself.
    rates.insert(base.clone(), 1.0);
    Ok(RateSnapshot {
        base,
        rates,
        as_of: response.date,
    })
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "FrankfurterFetch", skip(self), fields(base = %base))]
    async fn fetch_quote(&self, base: &str) -> FxResult<RateSnapshot> {
        let url = format!("{}/latest?from={}", self.base_url, base);
        let response: LatestResponse = get_json(NAME, &url).await?;
        to_snapshot(base, response)
    }
}
