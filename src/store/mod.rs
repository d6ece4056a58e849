//! Key-value store abstraction, well-known keys, and the canonical
//! deterministic binary codec (spec §4.6).

pub mod codec;
pub mod keys;
pub mod kv;

pub use codec::{Codec, CodecError, Reader, Writer};
pub use kv::{atomically, InMemoryStore, Store};
