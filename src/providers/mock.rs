//! Scripted rate provider for unit tests.

use crate::core::currency::{RateProvider, RateSnapshot};
use crate::core::error::{FxResult, ProviderError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub struct MockRateProvider {
    name: &'static str,
    quotes: HashMap<String, RateSnapshot>,
    delay: Option<Duration>,
    base_delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockRateProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            quotes: HashMap::new(),
            delay: None,
            base_delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_quote(mut self, base: &str, rates: &[(&str, f64)]) -> Self {
        let rates = rates.iter().map(|(c, r)| (c.to_string(), *r)).collect();
        self.quotes.insert(
            base.to_string(),
            RateSnapshot::new(base, rates, Some(format!("{}-{}", self.name, base))),
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay for one base only, overriding `with_delay`.
    pub fn with_base_delay(mut self, base: &str, delay: Duration) -> Self {
        self.base_delays.insert(base.to_string(), delay);
        self
    }

    /// Bases requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_quote(&self, base: &str) -> FxResult<RateSnapshot> {
        self.calls.lock().unwrap().push(base.to_string());
        if let Some(delay) = self.base_delays.get(base).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }
        self.quotes.get(base).cloned().ok_or_else(|| {
            ProviderError::Status {
                provider: self.name,
                status: 503,
            }
            .into()
        })
    }
}
