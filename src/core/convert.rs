//! Cross-rate conversion and USD pivot derivation.
use crate::core::currency::RateSnapshot;
use crate::core::error::{FxError, FxResult};
use std::collections::HashMap;
use tracing::debug;

/// Converts `amount` from one currency to another through the snapshot base.
///
/// Never fails. When the codes match, no snapshot is available, or either
/// rate is missing, the amount is returned unchanged so callers always have
/// a number to show.
pub fn convert(amount: f64, from: &str, to: &str, snapshot: Option<&RateSnapshot>) -> f64 {
    if from == to {
        return amount;
    }
    let Some(snapshot) = snapshot.filter(|s| s.has_rates()) else {
        debug!("No rates available, skipping conversion {from} -> {to}");
        return amount;
    };
    match (snapshot.rate(from), snapshot.rate(to)) {
        (Some(from_rate), Some(to_rate)) => amount / from_rate * to_rate,
        _ => {
            debug!("Missing rate for {from} or {to} in {} snapshot", snapshot.base);
            amount
        }
    }
}

/// Re-bases a USD snapshot onto `target`.
pub fn derive_from_usd(target: &str, usd: &RateSnapshot) -> FxResult<RateSnapshot> {
    let denom = usd
        .rate(target)
        .ok_or_else(|| FxError::DerivationUnavailable {
            target: target.to_string(),
        })?;

    let mut rates: HashMap<String, f64> = usd
        .rates
        .iter()
        .map(|(code, value)| (code.clone(), value / denom))
        .collect();
    rates.insert(target.to_string(), 1.0);

    Ok(RateSnapshot {
        base: target.to_string(),
        rates,
        as_of: usd.as_of.clone(),
    })
}
