//! Core types and traits for the Pinhole URL shortener.
//!
//! This crate holds the mapping record and its codec, the short key type,
//! the key-value backend contract, the mapping store built on top of it
//! and the [`Shortener`] boundary consumed by the gateway.

pub mod codec;
pub mod error;
pub mod key;
pub mod kv;
pub mod record;
pub mod shortener;
pub mod store;

pub use error::{CodecError, KeyError, ShortenerError, StoreError};
pub use key::ShortKey;
pub use kv::{KeyValueStore, ListPage};
pub use record::{MappingListing, MappingRecord, MappingSummary};
pub use shortener::Shortener;
pub use store::{KvLayout, KvMappingStore, MappingStore, ReadMappingStore};
