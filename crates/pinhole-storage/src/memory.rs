use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pinhole_core::error::Result;
use pinhole_core::{KeyValueStore, KvMappingStore, ListPage};

/// In-memory implementation of [`KeyValueStore`] using DashMap.
///
/// DashMap shards its locks, so concurrent reads and writes to different
/// keys do not block each other. Writes are immediately visible.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKv {
    storage: DashMap<String, String>,
}

impl InMemoryKv {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.storage.get(key).map(|value| value.clone()))
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.storage.insert(key.to_owned(), value);
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: String) -> Result<bool> {
        // The entry guard holds the shard lock, so check and insert are atomic.
        match self.storage.entry(key.to_owned()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
        }
    }

    async fn list(&self, prefix: &str, cursor: Option<String>, limit: usize) -> Result<ListPage> {
        // DashMap has no stable order, so pages are cut from a sorted
        // snapshot and the cursor is the last key handed out.
        let mut keys: Vec<String> = self
            .storage
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| key.starts_with(prefix))
            .filter(|key| cursor.as_deref().is_none_or(|after| key.as_str() > after))
            .collect();
        keys.sort_unstable();

        let limit = limit.max(1);
        let cursor = if keys.len() > limit {
            keys.truncate(limit);
            keys.last().cloned()
        } else {
            None
        };

        Ok(ListPage { keys, cursor })
    }
}

/// A mapping store kept entirely in process memory.
pub type InMemoryMappingStore = KvMappingStore<InMemoryKv>;
