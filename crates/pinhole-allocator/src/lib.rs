//! Short key allocation.
//!
//! [`KeyGenerator`]s produce candidate keys; the [`KeyAllocator`] checks
//! them against a mapping store, retrying on collision within a bounded
//! budget, and validates caller-supplied custom keys.

pub mod allocator;
pub mod error;
pub mod generator;

pub use allocator::{AllocatorSettings, KeyAllocator};
pub use error::AllocationError;
pub use generator::{KeyGenerator, RandomKeyGenerator, ALPHABET};
