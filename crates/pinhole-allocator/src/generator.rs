use pinhole_core::ShortKey;

/// Lowercase Latin alphabet used for generated keys.
pub const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Trait for generating candidate short keys.
///
/// Implementations are pure generators that don't interact with storage;
/// the [`KeyAllocator`](crate::KeyAllocator) checks candidates for
/// collisions.
pub trait KeyGenerator: Send + Sync + 'static {
    /// Generates a candidate key of exactly `length` symbols.
    fn generate(&self, length: usize) -> ShortKey;
}

/// Draws each symbol uniformly from [`ALPHABET`].
///
/// Randomness comes from `rand`'s thread-local generator, a ChaCha-based
/// CSPRNG reseeded from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeyGenerator;

impl RandomKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self, length: usize) -> ShortKey {
        let key: String = (0..length)
            .map(|_| char::from(ALPHABET[rand::random_range(0..ALPHABET.len())]))
            .collect();
        ShortKey::new_unchecked(key)
    }
}
