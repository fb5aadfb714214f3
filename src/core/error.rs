//! Error types for rate acquisition.
//!
//! None of these ever reach the user: the chain recovers from provider
//! failures and the rate context recovers from exhaustion.

use thiserror::Error;

/// A single adapter failed to produce a snapshot.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider}: request failed: {reason}")]
    Request {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider}: HTTP error {status}")]
    Status { provider: &'static str, status: u16 },

    #[error("{provider}: malformed response: {reason}")]
    Malformed {
        provider: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum FxError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The USD pivot snapshot has no usable rate for the requested base.
    #[error("USD snapshot has no rate for {target}")]
    DerivationUnavailable { target: String },

    #[error("All rate providers failed for base {base}")]
    AllProvidersExhausted { base: String },
}

pub type FxResult<T> = Result<T, FxError>;
