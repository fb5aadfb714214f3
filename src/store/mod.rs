pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{debug, warn};

/// A thread-safe key-value store that can hold multiple collections.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// Opens the durable store under `data_path`. If the keyspace cannot be
    /// opened the store still works, but persistent collections are
    /// unavailable.
    pub fn open(data_path: &Path) -> Self {
        let keyspace = match fjall::Config::new(data_path.join("store")).open() {
            Ok(keyspace) => Some(Arc::new(keyspace)),
            Err(e) => {
                warn!("Could not open data store at {}: {}", data_path.display(), e);
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    pub fn is_durable(&self) -> bool {
        self.keyspace.is_some()
    }

    /// Returns a persistent collection, falling back to memory when the disk
    /// store is unavailable.
    pub fn collection_or_memory(&self, name: &str) -> Arc<dyn KeyValueCollection> {
        self.get_collection(name, true, true)
            .or_else(|| self.get_collection(name, false, true))
            .unwrap_or_else(|| Arc::new(MemoryCollection::new()))
    }

    fn open_disk_collection(&self, name: &str) -> Option<Arc<dyn KeyValueCollection>> {
        let keyspace = self.keyspace.as_ref()?;
        match keyspace.open_partition(name, PartitionCreateOptions::default()) {
            Ok(partition) => Some(Arc::new(DiskCollection::new(Arc::clone(keyspace), partition))),
            Err(e) => {
                warn!("Could not open collection {}: {}", name, e);
                None
            }
        }
    }
}

impl Store for KeyValueStore {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>> {
        if persist && self.keyspace.is_none() {
            return None;
        }

        if let Some(collection) = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Some(Arc::clone(collection));
        }

        if !create_if_missing {
            return None;
        }

        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(collection) = collections.get(name) {
            return Some(Arc::clone(collection));
        }

        let collection: Arc<dyn KeyValueCollection> = if persist {
            self.open_disk_collection(name)?
        } else {
            Arc::new(MemoryCollection::new())
        };
        debug!("Created collection {} (persist: {})", name, persist);
        collections.insert(name.to_string(), Arc::clone(&collection));
        Some(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_collections_are_shared_by_name() {
        let dir = tempdir().unwrap();
        let store = KeyValueStore::open(dir.path());
        let first = store.get_collection("prefs", false, true).unwrap();
        first.put(b"k", b"v").await;

        let second = store.get_collection("prefs", false, false).unwrap();
        assert_eq!(second.get(b"k").await, Some(b"v".to_vec()));

        assert!(store.get_collection("other", false, false).is_none());
    }

    #[tokio::test]
    async fn test_unopenable_store_falls_back_to_memory() {
        let dir = tempdir().unwrap();
        // A regular file where the data directory should be
        let blocked = dir.path().join("data");
        std::fs::write(&blocked, b"not a directory").unwrap();

        let store = KeyValueStore::open(&blocked);
        assert!(!store.is_durable());
        assert!(store.get_collection("prefs", true, true).is_none());

        let collection = store.collection_or_memory("prefs");
        collection.put(b"k", b"v").await;
        assert_eq!(collection.get(b"k").await, Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_disk_store_persists_between_opens() {
        let dir = tempdir().unwrap();
        {
            let store = KeyValueStore::open(dir.path());
            assert!(store.is_durable());
            store.collection_or_memory("prefs").put(b"k", b"v").await;
        }

        let store = KeyValueStore::open(dir.path());
        let collection = store.collection_or_memory("prefs");
        assert_eq!(collection.get(b"k").await, Some(b"v".to_vec()));
    }
}
