//! Core business logic: currencies, rates, conversion and the monthly ledger

pub mod cache;
pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod format;
pub mod ledger;
pub mod log;
pub mod preferences;
pub mod rates;

// Re-export main types for cleaner imports
pub use currency::{CurrencyDescriptor, RateProvider, RateSnapshot};
pub use error::{FxError, ProviderError};
pub use rates::{FxContext, RatesFreshness};
