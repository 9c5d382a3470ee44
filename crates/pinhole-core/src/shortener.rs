use crate::error::ShortenerError;
use crate::key::ShortKey;
use crate::record::MappingListing;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ShortenerError>;

/// The interface the request handler consumes.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a mapping for `url` and returns its short key.
    ///
    /// With `custom_key` set, that exact key is used or the call fails with
    /// `InvalidKeyFormat` or `KeyTaken`. Otherwise a fresh key is allocated.
    async fn create_mapping(&self, url: &str, custom_key: Option<&str>) -> Result<ShortKey>;

    /// Resolves a key to its stored URL.
    ///
    /// Fails with `NotFound` for unknown keys and `CorruptRecord` when the
    /// stored value cannot be decoded.
    async fn resolve_mapping(&self, key: &str) -> Result<String>;

    /// Returns every stored mapping.
    async fn list_mappings(&self) -> Result<MappingListing>;
}
