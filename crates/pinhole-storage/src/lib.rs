//! Key-value backends for Pinhole mapping stores.

pub mod memory;
pub mod redis;

pub use memory::{InMemoryKv, InMemoryMappingStore};
pub use redis::{RedisKv, RedisMappingStore};

pub use pinhole_core::error::{Result, StoreError};
pub use pinhole_core::{KeyValueStore, KvLayout, KvMappingStore, MappingStore, ReadMappingStore};
