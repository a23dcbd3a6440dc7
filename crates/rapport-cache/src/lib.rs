//! Local cache layer for Rapport.
//!
//! Provides the [`KeyValueStore`] trait that abstracts over where cached
//! strings live (memory, a file, a platform keychain...), and
//! [`ProfileCache`], which stores one versioned profile blob under a fixed
//! key on top of any `KeyValueStore`.
//!
//! The cache is best-effort: the reconciler treats every [`CacheError`] as
//! a miss.
//!
//! # Feature Flags
//!
//! - `fs` (default) — [`FileStore`], a JSON file that survives restarts

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "fs")]
mod file;
mod memory;
mod profile_cache;

pub use error::CacheError;
#[cfg(feature = "fs")]
pub use file::FileStore;
pub use memory::MemoryStore;
pub use profile_cache::{CACHE_SCHEMA_VERSION, DEFAULT_CACHE_KEY, ProfileCache};

use std::future::Future;
use std::sync::Arc;

/// String key-value persistence.
///
/// No network access; implementations are expected to be fast, but the
/// reconciler still puts every call under a deadline.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value under `key`, or `None` if absent.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Deletes `key`. Deleting an absent key is not an error.
    fn remove(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}

impl<T: KeyValueStore> KeyValueStore for Arc<T> {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, CacheError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).set(key, value)
    }

    fn remove(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).remove(key)
    }
}
