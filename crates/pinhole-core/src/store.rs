use crate::codec;
use crate::error::{Result, StoreError};
use crate::key::ShortKey;
use crate::kv::KeyValueStore;
use crate::record::MappingRecord;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// A read-only view of a mapping store.
///
/// The key allocator only needs existence checks, so it depends on this
/// trait rather than on [`MappingStore`].
#[async_trait]
pub trait ReadMappingStore: Send + Sync + 'static {
    /// Retrieves the record for `key`.
    /// Returns `None` if the key does not exist.
    async fn get(&self, key: &ShortKey) -> Result<Option<MappingRecord>>;

    /// Checks whether a record is stored under `key`.
    async fn exists(&self, key: &ShortKey) -> Result<bool>;

    /// Returns every stored key, in no particular order.
    async fn list_keys(&self) -> Result<Vec<ShortKey>>;
}

#[async_trait]
pub trait MappingStore: ReadMappingStore {
    /// Writes `record` under `key`, replacing whatever was there.
    ///
    /// No uniqueness check happens here; callers check `exists` first or
    /// use [`put_if_absent`](MappingStore::put_if_absent).
    async fn put(&self, key: &ShortKey, record: &MappingRecord) -> Result<()>;

    /// Writes `record` only if `key` is free. Returns `true` if written.
    async fn put_if_absent(&self, key: &ShortKey, record: &MappingRecord) -> Result<bool>;
}

#[async_trait]
impl<T: ReadMappingStore + ?Sized> ReadMappingStore for Arc<T> {
    async fn get(&self, key: &ShortKey) -> Result<Option<MappingRecord>> {
        (**self).get(key).await
    }

    async fn exists(&self, key: &ShortKey) -> Result<bool> {
        (**self).exists(key).await
    }

    async fn list_keys(&self) -> Result<Vec<ShortKey>> {
        (**self).list_keys().await
    }
}

#[async_trait]
impl<T: MappingStore + ?Sized> MappingStore for Arc<T> {
    async fn put(&self, key: &ShortKey, record: &MappingRecord) -> Result<()> {
        (**self).put(key, record).await
    }

    async fn put_if_absent(&self, key: &ShortKey, record: &MappingRecord) -> Result<bool> {
        (**self).put_if_absent(key, record).await
    }
}

/// Layout settings for [`KvMappingStore`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct KvLayout {
    /// Prefix prepended to every short key in the backend.
    #[builder(default = "pinhole:url:".to_string(), setter(into))]
    pub key_prefix: String,
    /// Number of keys requested per list page.
    #[builder(default = 1000)]
    pub page_size: usize,
}

impl Default for KvLayout {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A [`MappingStore`] over a raw [`KeyValueStore`].
///
/// Records are encoded with [`codec`] and stored under
/// `key_prefix + short_key`.
#[derive(Debug, Clone)]
pub struct KvMappingStore<B> {
    backend: B,
    layout: KvLayout,
}

impl<B: KeyValueStore> KvMappingStore<B> {
    /// Creates a store with the default layout.
    pub fn new(backend: B) -> Self {
        Self::with_layout(backend, KvLayout::default())
    }

    pub fn with_layout(backend: B, layout: KvLayout) -> Self {
        Self { backend, layout }
    }

    /// Returns a reference to the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn storage_key(&self, key: &ShortKey) -> String {
        format!("{}{}", self.layout.key_prefix, key.as_str())
    }

    fn decode(&self, key: &ShortKey, blob: &str) -> Result<MappingRecord> {
        let corrupt = |reason: String| {
            warn!(key = %key, reason = %reason, "stored record is corrupt");
            StoreError::CorruptRecord {
                key: key.to_string(),
                reason,
            }
        };

        let record = codec::decode(blob).map_err(|e| corrupt(e.to_string()))?;
        if record.key != *key {
            return Err(corrupt(format!(
                "record claims key '{}'",
                record.key.as_str()
            )));
        }

        Ok(record)
    }
}

#[async_trait]
impl<B: KeyValueStore> ReadMappingStore for KvMappingStore<B> {
    async fn get(&self, key: &ShortKey) -> Result<Option<MappingRecord>> {
        trace!(key = %key, "fetching mapping record");

        let Some(blob) = self.backend.get(&self.storage_key(key)).await? else {
            trace!(key = %key, "mapping not found");
            return Ok(None);
        };

        self.decode(key, &blob).map(Some)
    }

    async fn exists(&self, key: &ShortKey) -> Result<bool> {
        Ok(self.backend.get(&self.storage_key(key)).await?.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<ShortKey>> {
        let prefix = self.layout.key_prefix.as_str();
        // Paginated backends may repeat keys across pages.
        let mut keys = BTreeSet::new();
        let mut cursor = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .backend
                .list(prefix, cursor, self.layout.page_size)
                .await?;
            pages += 1;

            for raw in page.keys {
                let Some(stripped) = raw.strip_prefix(prefix) else {
                    continue;
                };
                match ShortKey::parse(stripped) {
                    Ok(key) => {
                        keys.insert(key);
                    }
                    Err(e) => warn!(raw_key = %raw, error = %e, "ignoring foreign key under prefix"),
                }
            }

            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(count = keys.len(), pages, "listed mapping keys");
        Ok(keys.into_iter().collect())
    }
}

#[async_trait]
impl<B: KeyValueStore> MappingStore for KvMappingStore<B> {
    async fn put(&self, key: &ShortKey, record: &MappingRecord) -> Result<()> {
        self.backend
            .put(&self.storage_key(key), codec::encode(record))
            .await?;
        debug!(key = %key, "stored mapping record");
        Ok(())
    }

    async fn put_if_absent(&self, key: &ShortKey, record: &MappingRecord) -> Result<bool> {
        let written = self
            .backend
            .put_if_absent(&self.storage_key(key), codec::encode(record))
            .await?;
        debug!(key = %key, written, "conditionally stored mapping record");
        Ok(written)
    }
}
