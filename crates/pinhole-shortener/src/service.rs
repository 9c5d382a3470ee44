use async_trait::async_trait;
use pinhole_allocator::{AllocationError, AllocatorSettings, KeyAllocator, KeyGenerator};
use pinhole_core::record::parse_absolute_url;
use pinhole_core::{
    MappingListing, MappingRecord, MappingStore, ReadMappingStore, ShortKey, Shortener,
    ShortenerError, StoreError,
};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, ShortenerError>;

/// How a new mapping is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Check `exists`, then `put`. Two concurrent creators of the same key
    /// can both succeed; the later write wins.
    BestEffort,
    /// Write with `put_if_absent`. Exactly one concurrent creator of a key
    /// succeeds.
    #[default]
    Conditional,
}

impl Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::BestEffort => write!(f, "best-effort"),
            WriteMode::Conditional => write!(f, "conditional"),
        }
    }
}

/// Configures a [`ShortenerService`].
#[derive(Debug, Clone, Copy, Default, TypedBuilder)]
pub struct ShortenerSettings {
    #[builder(default)]
    pub write_mode: WriteMode,
    #[builder(default)]
    pub allocator: AllocatorSettings,
}

/// A concrete implementation of the [`Shortener`] trait.
///
/// This service wraps a [`MappingStore`] and a [`KeyAllocator`] to handle:
/// - URL validation
/// - Short key allocation (generated or custom)
/// - Writing the record according to the configured [`WriteMode`]
pub struct ShortenerService<S, G> {
    store: Arc<S>,
    allocator: Arc<KeyAllocator<Arc<S>, G>>,
    write_mode: WriteMode,
}

impl<S, G> Clone for ShortenerService<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            allocator: Arc::clone(&self.allocator),
            write_mode: self.write_mode,
        }
    }
}

impl<S: MappingStore, G: KeyGenerator> ShortenerService<S, G> {
    /// Creates a service with default settings.
    pub fn new(store: S, generator: G) -> Self {
        Self::with_settings(store, generator, ShortenerSettings::default())
    }

    pub fn with_settings(store: S, generator: G, settings: ShortenerSettings) -> Self {
        let store = Arc::new(store);
        let allocator = KeyAllocator::new(Arc::clone(&store), generator, settings.allocator);
        Self {
            store,
            allocator: Arc::new(allocator),
            write_mode: settings.write_mode,
        }
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn validate_url(url: &str) -> Result<()> {
        parse_absolute_url(url)
            .map(|_| ())
            .map_err(ShortenerError::InvalidUrl)
    }

    async fn create_custom(&self, url: &str, custom: &str) -> Result<ShortKey> {
        match self.write_mode {
            WriteMode::BestEffort => {
                let key = self.allocator.validate(custom).await?;
                let record = MappingRecord::new(key.clone(), url);
                self.store.put(&key, &record).await?;
                Ok(key)
            }
            WriteMode::Conditional => {
                let key = ShortKey::parse(custom).map_err(AllocationError::from)?;
                let record = MappingRecord::new(key.clone(), url);
                if !self.store.put_if_absent(&key, &record).await? {
                    debug!(key = %key, "custom key already taken");
                    return Err(ShortenerError::KeyTaken(key.to_string()));
                }
                Ok(key)
            }
        }
    }

    async fn create_generated(&self, url: &str) -> Result<ShortKey> {
        match self.write_mode {
            WriteMode::BestEffort => {
                let key = self.allocator.allocate().await?;
                let record = MappingRecord::new(key.clone(), url);
                self.store.put(&key, &record).await?;
                Ok(key)
            }
            WriteMode::Conditional => {
                // Same bounded schedule as `allocate`, but the write itself is
                // the existence check.
                let mut attempts = 0;
                for length in self.allocator.schedule() {
                    attempts += 1;
                    let key = self.allocator.candidate(length);
                    let record = MappingRecord::new(key.clone(), url);
                    if self.store.put_if_absent(&key, &record).await? {
                        return Ok(key);
                    }
                    trace!(key = %key, attempts, "generated key collided");
                }

                warn!(attempts, "short key allocation exhausted");
                Err(ShortenerError::AllocationExhausted { attempts })
            }
        }
    }
}

#[async_trait]
impl<S: MappingStore, G: KeyGenerator> Shortener for ShortenerService<S, G> {
    async fn create_mapping(&self, url: &str, custom_key: Option<&str>) -> Result<ShortKey> {
        Self::validate_url(url)?;

        let key = match custom_key {
            Some(custom) => self.create_custom(url, custom).await?,
            None => self.create_generated(url).await?,
        };

        info!(key = %key, url, write_mode = %self.write_mode, "created mapping");
        Ok(key)
    }

    async fn resolve_mapping(&self, key: &str) -> Result<String> {
        // A key outside the alphabet can never have been stored.
        let Ok(short_key) = ShortKey::parse(key) else {
            trace!(key, "lookup with malformed key");
            return Err(ShortenerError::NotFound(key.to_string()));
        };

        match self.store.get(&short_key).await? {
            Some(record) => {
                debug!(key = %short_key, url = %record.url, "resolved short key");
                Ok(record.url)
            }
            None => {
                trace!(key = %short_key, "short key not found");
                Err(ShortenerError::NotFound(key.to_string()))
            }
        }
    }

    async fn list_mappings(&self) -> Result<MappingListing> {
        let keys = self.store.list_keys().await?;
        let mut listing = MappingListing::default();

        for key in keys {
            match self.store.get(&key).await {
                Ok(Some(record)) => listing.mappings.push(record.into()),
                // Listed but gone or not yet visible; nothing to report.
                Ok(None) => trace!(key = %key, "listed key has no record"),
                Err(StoreError::CorruptRecord { .. }) => listing.corrupt.push(key),
                Err(e) => return Err(e.into()),
            }
        }

        debug!(
            mappings = listing.mappings.len(),
            corrupt = listing.corrupt.len(),
            "listed mappings"
        );
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;
    use pinhole_allocator::RandomKeyGenerator;
    use pinhole_core::KeyValueStore;
    use pinhole_storage::{InMemoryKv, InMemoryMappingStore};
    use std::collections::HashMap;

    type TestService = ShortenerService<InMemoryMappingStore, RandomKeyGenerator>;

    fn test_service(write_mode: WriteMode) -> TestService {
        let settings = ShortenerSettings::builder().write_mode(write_mode).build();
        ShortenerService::with_settings(
            InMemoryMappingStore::new(InMemoryKv::new()),
            RandomKeyGenerator::new(),
            settings,
        )
    }

    const MODES: [WriteMode; 2] = [WriteMode::BestEffort, WriteMode::Conditional];

    /// Always proposes the same key.
    struct ConstantGenerator(&'static str);

    impl KeyGenerator for ConstantGenerator {
        fn generate(&self, _length: usize) -> ShortKey {
            ShortKey::new_unchecked(self.0)
        }
    }

    #[tokio::test]
    async fn default_settings_use_conditional_writes() {
        let service = ShortenerService::new(
            InMemoryMappingStore::new(InMemoryKv::new()),
            RandomKeyGenerator::new(),
        );
        assert_eq!(service.write_mode(), WriteMode::Conditional);
    }

    #[tokio::test]
    async fn create_generated_then_resolve() {
        for mode in MODES {
            let service = test_service(mode);

            let key = service
                .create_mapping("https://example.com/path", None)
                .await
                .unwrap();

            assert_eq!(key.len(), 6);
            assert!(key.as_str().bytes().all(|b| b.is_ascii_lowercase()));
            assert_eq!(
                service.resolve_mapping(key.as_str()).await.unwrap(),
                "https://example.com/path"
            );
        }
    }

    #[tokio::test]
    async fn create_with_custom_key() {
        for mode in MODES {
            let service = test_service(mode);

            let key = service
                .create_mapping("https://example.com", Some("my1key"))
                .await
                .unwrap();

            assert_eq!(key.as_str(), "my1key");
            assert_eq!(
                service.resolve_mapping("my1key").await.unwrap(),
                "https://example.com"
            );
        }
    }

    #[tokio::test]
    async fn duplicate_custom_key_is_taken() {
        for mode in MODES {
            let service = test_service(mode);

            service
                .create_mapping("https://one.example", Some("abc"))
                .await
                .unwrap();
            let err = service
                .create_mapping("https://two.example", Some("abc"))
                .await
                .unwrap_err();

            assert!(matches!(err, ShortenerError::KeyTaken(ref k) if k == "abc"));
            // The first mapping is untouched.
            assert_eq!(
                service.resolve_mapping("abc").await.unwrap(),
                "https://one.example"
            );
        }
    }

    #[tokio::test]
    async fn invalid_custom_key_never_touches_store() {
        for mode in MODES {
            let service = test_service(mode);

            for bad in ["ABC", "abc-def", "a_b", "with space", "dot.ted", ""] {
                let err = service
                    .create_mapping("https://example.com", Some(bad))
                    .await
                    .unwrap_err();
                assert!(
                    matches!(err, ShortenerError::InvalidKeyFormat(_)),
                    "{bad:?} should be rejected"
                );
            }
            assert!(service.store().backend().is_empty());
        }
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_allocation() {
        for mode in MODES {
            let service = test_service(mode);

            for bad in ["", "not-a-valid-url", "/relative", "https://"] {
                let err = service.create_mapping(bad, None).await.unwrap_err();
                assert!(matches!(err, ShortenerError::InvalidUrl(_)), "{bad:?}");
            }
            // Checked before the key, so a bad key with a bad URL is InvalidUrl.
            let err = service
                .create_mapping("nope", Some("BAD"))
                .await
                .unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl(_)));
            assert!(service.store().backend().is_empty());
        }
    }

    #[tokio::test]
    async fn resolve_unknown_key_is_not_found() {
        let service = test_service(WriteMode::Conditional);

        let err = service.resolve_mapping("nothere").await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(ref k) if k == "nothere"));

        let err = service.resolve_mapping("Not-A-Key").await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound(_)));
    }

    #[tokio::test]
    async fn resolve_corrupt_record() {
        let service = test_service(WriteMode::Conditional);
        service
            .store()
            .backend()
            .put("pinhole:url:broken", "garbage".to_string())
            .await
            .unwrap();

        let err = service.resolve_mapping("broken").await.unwrap_err();
        assert!(matches!(err, ShortenerError::CorruptRecord { ref key, .. } if key == "broken"));
    }

    #[tokio::test]
    async fn list_returns_exactly_created_mappings() {
        let service = test_service(WriteMode::Conditional);
        let expected = HashMap::from([
            ("a1", "https://a.example/1"),
            ("b2", "https://b.example/2"),
            ("c3", "https://c.example/3"),
        ]);
        for (key, url) in &expected {
            service.create_mapping(url, Some(*key)).await.unwrap();
        }

        let listing = service.list_mappings().await.unwrap();

        assert!(listing.corrupt.is_empty());
        let got: HashMap<&str, &str> = listing
            .mappings
            .iter()
            .map(|m| (m.key.as_str(), m.url.as_str()))
            .collect();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn list_reports_corrupt_records_separately() {
        let service = test_service(WriteMode::Conditional);
        service
            .create_mapping("https://ok.example", Some("good"))
            .await
            .unwrap();
        service
            .store()
            .backend()
            .put("pinhole:url:bad", "{}".to_string())
            .await
            .unwrap();

        let listing = service.list_mappings().await.unwrap();

        assert_eq!(listing.mappings.len(), 1);
        assert_eq!(listing.mappings[0].key.as_str(), "good");
        assert_eq!(listing.corrupt, vec![ShortKey::parse("bad").unwrap()]);
    }

    #[tokio::test]
    async fn list_of_empty_store() {
        let service = test_service(WriteMode::BestEffort);
        assert_eq!(
            service.list_mappings().await.unwrap(),
            MappingListing::default()
        );
    }

    #[tokio::test]
    async fn generated_collisions_exhaust_in_conditional_mode() {
        let settings = ShortenerSettings::builder()
            .write_mode(WriteMode::Conditional)
            .allocator(
                AllocatorSettings::builder()
                    .max_attempts(3)
                    .max_extra_length(0)
                    .build(),
            )
            .build();
        let service = ShortenerService::with_settings(
            InMemoryMappingStore::new(InMemoryKv::new()),
            ConstantGenerator("stuck"),
            settings,
        );

        assert_eq!(
            service
                .create_mapping("https://one.example", None)
                .await
                .unwrap()
                .as_str(),
            "stuck"
        );
        let err = service
            .create_mapping("https://two.example", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::AllocationExhausted { attempts: 3 }
        ));
        assert_eq!(
            service.resolve_mapping("stuck").await.unwrap(),
            "https://one.example"
        );
    }

    #[tokio::test]
    async fn generated_collisions_exhaust_in_best_effort_mode() {
        let settings = ShortenerSettings::builder()
            .write_mode(WriteMode::BestEffort)
            .allocator(
                AllocatorSettings::builder()
                    .max_attempts(2)
                    .max_extra_length(1)
                    .build(),
            )
            .build();
        let service = ShortenerService::with_settings(
            InMemoryMappingStore::new(InMemoryKv::new()),
            ConstantGenerator("stuck"),
            settings,
        );

        service
            .create_mapping("https://one.example", None)
            .await
            .unwrap();
        let err = service
            .create_mapping("https://two.example", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::AllocationExhausted { attempts: 4 }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_custom_creates_leave_one_whole_url() {
        for mode in MODES {
            for _ in 0..20 {
                let service = Arc::new(test_service(mode));

                let first = tokio::spawn({
                    let service = Arc::clone(&service);
                    async move {
                        service
                            .create_mapping("https://one.example", Some("dup"))
                            .await
                    }
                });
                let second = tokio::spawn({
                    let service = Arc::clone(&service);
                    async move {
                        service
                            .create_mapping("https://two.example", Some("dup"))
                            .await
                    }
                });

                let results = [first.await.unwrap(), second.await.unwrap()];
                let winners = results.iter().filter(|r| r.is_ok()).count();
                for result in &results {
                    if let Err(e) = result {
                        assert!(matches!(e, ShortenerError::KeyTaken(_)), "{e:?}");
                    }
                }

                let resolved = service.resolve_mapping("dup").await.unwrap();
                assert!(resolved == "https://one.example" || resolved == "https://two.example");

                match mode {
                    WriteMode::Conditional => {
                        assert_eq!(winners, 1);
                        let winner_url = if results[0].is_ok() {
                            "https://one.example"
                        } else {
                            "https://two.example"
                        };
                        assert_eq!(resolved, winner_url);
                    }
                    // Last writer wins; both may report success.
                    WriteMode::BestEffort => assert!(winners >= 1),
                }
            }
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_unavailable() {
        struct DownKv;

        #[async_trait]
        impl KeyValueStore for DownKv {
            async fn get(&self, _key: &str) -> pinhole_core::error::Result<Option<String>> {
                Err(StoreError::Unavailable("down".to_string()))
            }

            async fn put(&self, _key: &str, _value: String) -> pinhole_core::error::Result<()> {
                Err(StoreError::Unavailable("down".to_string()))
            }

            async fn put_if_absent(
                &self,
                _key: &str,
                _value: String,
            ) -> pinhole_core::error::Result<bool> {
                Err(StoreError::Unavailable("down".to_string()))
            }

            async fn list(
                &self,
                _prefix: &str,
                _cursor: Option<String>,
                _limit: usize,
            ) -> pinhole_core::error::Result<pinhole_core::ListPage> {
                Err(StoreError::Unavailable("down".to_string()))
            }
        }

        for mode in MODES {
            let settings = ShortenerSettings::builder().write_mode(mode).build();
            let service = ShortenerService::with_settings(
                pinhole_core::KvMappingStore::new(DownKv),
                RandomKeyGenerator::new(),
                settings,
            );

            assert!(matches!(
                service.create_mapping("https://example.com", None).await,
                Err(ShortenerError::StoreUnavailable(_))
            ));
            assert!(matches!(
                service
                    .create_mapping("https://example.com", Some("abc"))
                    .await,
                Err(ShortenerError::StoreUnavailable(_))
            ));
            assert!(matches!(
                service.resolve_mapping("abc").await,
                Err(ShortenerError::StoreUnavailable(_))
            ));
            assert!(matches!(
                service.list_mappings().await,
                Err(ShortenerError::StoreUnavailable(_))
            ));
        }
    }

    #[tokio::test]
    async fn records_carry_creation_time() {
        let service = test_service(WriteMode::Conditional);
        let before = Timestamp::now();

        let key = service
            .create_mapping("https://example.com", Some("stamped"))
            .await
            .unwrap();
        let record = service.store().get(&key).await.unwrap().unwrap();

        assert!(record.created_at >= before);
        assert_eq!(record.key, key);
    }

    #[test]
    fn service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TestService>();
    }
}
