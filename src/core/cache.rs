//! Key-value storage abstractions shared by preferences and rate persistence.

use async_trait::async_trait;
use std::sync::Arc;

/// A named bucket of opaque byte values.
///
/// Storage failures are logged by the implementation and surface as a miss,
/// never as an error: everything persisted here can be recomputed.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8]);
    async fn remove(&self, key: &[u8]);
}

pub trait Store: Send + Sync {
    /// Returns the collection called `name`, creating it when asked to.
    ///
    /// `persist` selects durable storage; `None` means the durable backend is
    /// unavailable.
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;
}
