use crate::core::error::ProviderError;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("brational/", env!("CARGO_PKG_VERSION"));
const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;
const BASE_RATE_TOLERANCE: f64 = 1e-6;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// GETs `url` and decodes the JSON body into `T`.
///
/// Send failures are retried; a non-success status or an undecodable body
/// fails immediately.
pub async fn get_json<T: DeserializeOwned>(
    provider: &'static str,
    url: &str,
) -> Result<T, ProviderError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::Request {
            provider,
            reason: e.to_string(),
        })?;

    debug!("Requesting rates from {}", url);
    let response = with_retry(|| client.get(url).send(), RETRIES, RETRY_DELAY_MS)
        .await
        .map_err(|e| ProviderError::Request {
            provider,
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
        });
    }

    let text = response.text().await.map_err(|e| ProviderError::Request {
        provider,
        reason: e.to_string(),
    })?;

    serde_json::from_str(&text).map_err(|e| ProviderError::Malformed {
        provider,
        reason: e.to_string(),
    })
}

/// Rejects a table that prices `base` at anything other than 1. That only
/// happens when the provider answered for a different base than requested.
pub fn check_base_rate(
    provider: &'static str,
    base: &str,
    rates: &HashMap<String, f64>,
) -> Result<(), ProviderError> {
    match rates.get(base) {
        Some(rate) if (rate - 1.0).abs() > BASE_RATE_TOLERANCE => Err(ProviderError::Malformed {
            provider,
            reason: format!("rate for base {base} is {rate}, expected 1"),
        }),
        _ => Ok(()),
    }
}
