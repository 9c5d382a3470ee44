use crate::error::Result;
use async_trait::async_trait;

/// One page of keys returned by [`KeyValueStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Raw keys in this page, including the listing prefix.
    pub keys: Vec<String>,
    /// Continuation cursor; `None` once the listing is exhausted.
    pub cursor: Option<String>,
}

/// A string-keyed, string-valued store.
///
/// This is the raw backend underneath a
/// [`KvMappingStore`](crate::store::KvMappingStore). Backends may be
/// eventually consistent: a read right after a write is not guaranteed to
/// observe it.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value stored at `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` at `key`, overwriting any previous value.
    async fn put(&self, key: &str, value: String) -> Result<()>;

    /// Writes `value` at `key` only if no value exists yet.
    ///
    /// Returns `true` if the value was written.
    async fn put_if_absent(&self, key: &str, value: String) -> Result<bool>;

    /// Lists keys starting with `prefix`.
    ///
    /// Pass the `cursor` of the previous page to continue. A page may hold
    /// fewer than `limit` keys (or none) without the listing being over;
    /// only a `None` cursor ends it.
    async fn list(&self, prefix: &str, cursor: Option<String>, limit: usize) -> Result<ListPage>;
}
