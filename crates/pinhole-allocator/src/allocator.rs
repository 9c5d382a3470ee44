use crate::error::AllocationError;
use crate::generator::KeyGenerator;
use pinhole_core::{ReadMappingStore, ShortKey};
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, AllocationError>;

/// Configures a [`KeyAllocator`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct AllocatorSettings {
    /// Length of generated keys.
    #[builder(default = 6)]
    pub key_length: usize,
    /// Candidates tried per key length before widening.
    #[builder(default = 16)]
    pub max_attempts: usize,
    /// How many times the key may grow by one symbol after a full round of
    /// collisions.
    #[builder(default = 2)]
    pub max_extra_length: usize,
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Produces short keys that are free in the store at allocation time, and
/// validates caller-supplied keys against the same check.
///
/// Nothing is reserved: another writer may take the key between
/// allocation and the caller's write.
#[derive(Debug, Clone)]
pub struct KeyAllocator<S, G> {
    store: S,
    generator: G,
    settings: AllocatorSettings,
}

impl<S: ReadMappingStore, G: KeyGenerator> KeyAllocator<S, G> {
    pub fn new(store: S, generator: G, settings: AllocatorSettings) -> Self {
        Self {
            store,
            generator,
            settings,
        }
    }

    /// Key lengths to try, one entry per candidate, in order.
    ///
    /// `max_attempts` candidates at `key_length`, then the same at each
    /// widened length.
    pub fn schedule(&self) -> impl Iterator<Item = usize> {
        let AllocatorSettings {
            key_length,
            max_attempts,
            max_extra_length,
        } = self.settings;

        (key_length..=key_length + max_extra_length)
            .flat_map(move |length| std::iter::repeat_n(length, max_attempts.max(1)))
    }

    /// Generates one unchecked candidate of the given length.
    pub fn candidate(&self, length: usize) -> ShortKey {
        self.generator.generate(length)
    }

    /// Allocates a key that does not exist in the store.
    pub async fn allocate(&self) -> Result<ShortKey> {
        let mut attempts = 0;
        let mut current_length = self.settings.key_length;

        for length in self.schedule() {
            if length != current_length {
                warn!(
                    from = current_length,
                    to = length,
                    attempts,
                    "every candidate collided, widening generated keys"
                );
                current_length = length;
            }

            attempts += 1;
            let candidate = self.candidate(length);
            if !self.store.exists(&candidate).await? {
                debug!(key = %candidate, attempts, "allocated short key");
                return Ok(candidate);
            }
            trace!(key = %candidate, attempts, "generated key collided");
        }

        warn!(attempts, "short key allocation exhausted");
        Err(AllocationError::Exhausted { attempts })
    }

    /// Checks a caller-supplied key for format and availability.
    ///
    /// The format check happens before any store access.
    pub async fn validate(&self, custom: &str) -> Result<ShortKey> {
        let key = ShortKey::parse(custom)?;

        if self.store.exists(&key).await? {
            debug!(key = %key, "custom key already taken");
            return Err(AllocationError::KeyTaken(key.to_string()));
        }

        Ok(key)
    }
}
