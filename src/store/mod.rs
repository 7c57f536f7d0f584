//! Key-value persistence for the TTL caches.
//!
//! The caches only need `get`/`put` of whole JSON payloads; keeping the
//! storage medium behind this trait lets production run on JSON files while
//! tests use an in-memory map.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use serde_json::Value;

/// A named slot holding one opaque JSON payload.
///
/// `get` returns `None` for both "absent" and "unreadable" entries: a corrupt
/// cache file is indistinguishable from a missing one and triggers a refetch,
/// never an error.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, payload: &Value) -> Result<()>;
}
