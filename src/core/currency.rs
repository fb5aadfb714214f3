//! Currency catalog, rate snapshots and the rate provider abstraction

use crate::core::error::FxResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CurrencyDescriptor {
    pub code: &'static str,
    pub locale: &'static str,
    pub symbol: &'static str,
}

pub static CURRENCIES: [CurrencyDescriptor; 3] = [
    CurrencyDescriptor {
        code: "USD",
        locale: "en-US",
        symbol: "$",
    },
    CurrencyDescriptor {
        code: "EUR",
        locale: "de-DE",
        symbol: "€",
    },
    CurrencyDescriptor {
        code: "GEL",
        locale: "ka-GE",
        symbol: "₾",
    },
];

pub const DEFAULT_BASE_CODE: &str = "GEL";
pub const PIVOT_CODE: &str = "USD";

/// Looks up a catalog entry, ignoring case.
pub fn find_currency(code: &str) -> Option<&'static CurrencyDescriptor> {
    CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
}

pub fn default_currency() -> &'static CurrencyDescriptor {
    find_currency(DEFAULT_BASE_CODE).unwrap_or(&CURRENCIES[0])
}

/// One complete table of exchange rates relative to `base`.
///
/// `rates[code]` is the number of `code` units one unit of `base` buys, and
/// `rates[base]` is always 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: String,
    pub rates: HashMap<String, f64>,
    #[serde(rename = "date", default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
}

impl RateSnapshot {
    /// Builds a snapshot, inserting the identity rate for `base` when the
    /// table does not carry it.
    pub fn new(
        base: impl Into<String>,
        mut rates: HashMap<String, f64>,
        as_of: Option<String>,
    ) -> Self {
        let base = base.into();
        rates.entry(base.clone()).or_insert(1.0);
        Self { base, rates, as_of }
    }

    /// Returns the rate for `code` if it is present and usable.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates
            .get(code)
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
    }

    pub fn has_rates(&self) -> bool {
        !self.rates.is_empty()
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn fetch_quote(&self, base: &str) -> FxResult<RateSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_currency_ignores_case() {
        assert_eq!(find_currency("eur").map(|c| c.symbol), Some("€"));
        assert_eq!(find_currency(" GEL ").map(|c| c.locale), Some("ka-GE"));
        assert!(find_currency("JPY").is_none());
        assert_eq!(default_currency().code, "GEL");
    }

    #[test]
    fn test_new_snapshot_inserts_identity_rate() {
        let snapshot = RateSnapshot::new(
            "USD",
            HashMap::from([("EUR".to_string(), 0.9)]),
            None,
        );
        assert_eq!(snapshot.rate("USD"), Some(1.0));
        assert_eq!(snapshot.rate("EUR"), Some(0.9));
    }

    #[test]
    fn test_rate_skips_unusable_values() {
        let snapshot = RateSnapshot {
            base: "USD".to_string(),
            rates: HashMap::from([
                ("USD".to_string(), 1.0),
                ("EUR".to_string(), 0.0),
                ("GEL".to_string(), f64::NAN),
            ]),
            as_of: None,
        };
        assert!(snapshot.rate("EUR").is_none());
        assert!(snapshot.rate("GEL").is_none());
        assert!(snapshot.rate("JPY").is_none());
    }

    #[test]
    fn test_snapshot_blob_uses_date_field() {
        let json = r#"{"base":"GEL","rates":{"GEL":1,"USD":0.37},"date":"2026-10-17"}"#;
        let snapshot: RateSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.as_of.as_deref(), Some("2026-10-17"));

        let without_date: RateSnapshot =
            serde_json::from_str(r#"{"base":"GEL","rates":{"GEL":1}}"#).unwrap();
        assert!(without_date.as_of.is_none());
        assert!(!serde_json::to_string(&without_date).unwrap().contains("date"));
    }
}
