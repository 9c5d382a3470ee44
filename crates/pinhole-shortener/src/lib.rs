//! URL shortener service implementation.
//!
//! This crate composes a mapping store and a key allocator into the
//! [`Shortener`](pinhole_core::Shortener) consumed by the gateway. Core
//! types are re-exported from `pinhole_core`.

pub mod service;

pub use pinhole_core::{Shortener, ShortenerError};
pub use service::{ShortenerService, ShortenerSettings, WriteMode};
