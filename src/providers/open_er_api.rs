use super::util::{check_base_rate, get_json};
use crate::core::currency::{RateProvider, RateSnapshot};
use crate::core::error::{FxResult, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;

const NAME: &str = "open.er-api.com";
const SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: Option<String>,
    base_code: Option<String>,
    time_last_update_utc: Option<String>,
    rates: Option<HashMap<String, f64>>,
}

/// open.er-api.com v6 `latest` endpoint.
///
/// The payload carries its own status flag, and the base it reports is the
/// one the snapshot uses since the service may normalise the request.
pub struct OpenErApiProvider {
    base_url: String,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn malformed(reason: impl Into<String>) -> ProviderError {
    ProviderError::Malformed {
        provider: NAME,
        reason: reason.into(),
    }
}

fn to_snapshot(response: LatestResponse) -> FxResult<RateSnapshot> {
    match response.result.as_deref() {
        Some(SUCCESS) => {}
        other => return Err(malformed(format!("result was {other:?}")).into()),
    }
    let base = response
        .base_code
        .filter(|b| !b.is_empty())
        .ok_or_else(|| malformed("missing base_code"))?;
    let rates = response
        .rates
        .filter(|r| !r.is_empty())
        .ok_or_else(|| malformed("missing rates"))?;
    check_base_rate(NAME, &base, &rates)?;
    Ok(RateSnapshot::new(base, rates, response.time_last_update_utc))
}

#[async_trait]
impl RateProvider for OpenErApiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "OpenErApiFetch", skip(self), fields(base = %base))]
    async fn fetch_quote(&self, base: &str) -> FxResult<RateSnapshot> {
        let url = format!("{}/v6/latest/{}", self.base_url, base);
        let response: LatestResponse = get_json(NAME, &url).await?;
        to_snapshot(response)
    }
}
