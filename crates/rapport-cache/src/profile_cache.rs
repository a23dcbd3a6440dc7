//! The profile cache: one versioned profile blob under a fixed key.
//!
//! The blob is the profile's fields, flat, plus two bookkeeping fields:
//!
//! ```text
//! {"version":1,"owner":"user-1","fullName":"Ada","email":"ada@x.com",
//!  "phoneNumber":"555-0100","companyName":null,"isAgency":"No"}
//! ```
//!
//! - `version` lets a future change to the profile's shape detect and
//!   discard entries it can't read, instead of deserializing old fields into
//!   the wrong places.
//! - `owner` is the identity the profile belongs to, so a cache left behind
//!   by one account is never shown to another.

use rapport_model::{Codec, IdentityId, JsonCodec, Profile};
use serde::{Deserialize, Serialize};

use crate::{CacheError, KeyValueStore};

/// Schema version written into every cached profile.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// Key the profile blob lives under unless configured otherwise.
pub const DEFAULT_CACHE_KEY: &str = "popx_user";

#[derive(Serialize)]
struct CachedProfileRef<'a> {
    version: u32,
    owner: &'a IdentityId,
    #[serde(flatten)]
    profile: &'a Profile,
}

#[derive(Deserialize)]
struct CachedProfile {
    owner: IdentityId,
    #[serde(flatten)]
    profile: Profile,
}

/// Reads only the version tag, so entries of any shape can be classified
/// before the real decode is attempted.
#[derive(Deserialize)]
struct VersionHeader {
    #[serde(default)]
    version: Option<u32>,
}

/// Stores and loads the cached profile on top of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct ProfileCache<K, C = JsonCodec> {
    store: K,
    key: String,
    codec: C,
}

impl<K: KeyValueStore> ProfileCache<K> {
    /// A JSON-encoded profile cache under [`DEFAULT_CACHE_KEY`].
    pub fn new(store: K) -> Self {
        Self::with_codec(store, DEFAULT_CACHE_KEY, JsonCodec)
    }
}

impl<K: KeyValueStore, C: Codec> ProfileCache<K, C> {
    pub fn with_codec(store: K, key: impl Into<String>, codec: C) -> Self {
        Self {
            store,
            key: key.into(),
            codec,
        }
    }

    /// Uses a different key for the blob.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the cached profile for `owner`.
    ///
    /// Returns `Ok(None)` when there's no entry, when the entry belongs to a
    /// different identity, or when it can't be used. Unusable entries (wrong
    /// or missing version, undecodable) are deleted so they aren't
    /// re-examined on every load.
    ///
    /// # Errors
    /// Only storage failures are returned; the caller should treat them as a
    /// miss too.
    pub async fn load(&self, owner: &IdentityId) -> Result<Option<Profile>, CacheError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            tracing::trace!(key = %self.key, "profile cache empty");
            return Ok(None);
        };

        match self.decode(&raw) {
            Ok(cached) if cached.owner == *owner => Ok(Some(cached.profile)),
            Ok(cached) => {
                tracing::debug!(
                    key = %self.key,
                    cached_owner = %cached.owner,
                    %owner,
                    "cached profile belongs to another identity"
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding unusable cached profile");
                self.store.remove(&self.key).await?;
                Ok(None)
            }
        }
    }

    /// Overwrites the cached profile with `profile`, owned by `owner`.
    pub async fn save(&self, owner: &IdentityId, profile: &Profile) -> Result<(), CacheError> {
        let text = self.codec.encode(&CachedProfileRef {
            version: CACHE_SCHEMA_VERSION,
            owner,
            profile,
        })?;
        self.store.set(&self.key, text).await
    }

    /// Removes the cached profile.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.store.remove(&self.key).await
    }

    fn decode(&self, raw: &str) -> Result<CachedProfile, CacheError> {
        let header: VersionHeader = self.codec.decode(raw)?;
        match header.version {
            Some(CACHE_SCHEMA_VERSION) => Ok(self.codec.decode(raw)?),
            Some(other) => Err(rapport_model::CodecError::Incompatible(format!(
                "cache schema version {other}, expected {CACHE_SCHEMA_VERSION}"
            ))
            .into()),
            None => Err(rapport_model::CodecError::Incompatible(
                "cached profile has no schema version".into(),
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rapport_model::AgencyFlag;

    use super::*;
    use crate::MemoryStore;

    fn ada() -> Profile {
        Profile {
            full_name: "Ada".into(),
            email: "ada@x.com".into(),
            phone_number: "555-0100".into(),
            company_name: Some("Engines Ltd".into()),
            is_agency: AgencyFlag::Yes,
        }
    }

    fn owner() -> IdentityId {
        IdentityId::new("user-1")
    }

    #[tokio::test]
    async fn test_save_then_load_returns_profile() {
        let cache = ProfileCache::new(MemoryStore::new());
        cache.save(&owner(), &ada()).await.unwrap();

        assert_eq!(cache.load(&owner()).await.unwrap(), Some(ada()));
    }

    #[tokio::test]
    async fn test_saved_blob_is_flat_and_versioned() {
        let store = MemoryStore::new();
        let cache = ProfileCache::new(store.clone());
        cache.save(&owner(), &ada()).await.unwrap();

        let raw = store.get(DEFAULT_CACHE_KEY).await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(json["version"], CACHE_SCHEMA_VERSION);
        assert_eq!(json["owner"], "user-1");
        assert_eq!(json["fullName"], "Ada");
        assert_eq!(json["isAgency"], "Yes");
    }

    #[tokio::test]
    async fn test_load_other_owner_is_miss_but_kept() {
        let store = MemoryStore::new();
        let cache = ProfileCache::new(store.clone());
        cache.save(&owner(), &ada()).await.unwrap();

        let loaded = cache.load(&IdentityId::new("user-2")).await.unwrap();

        assert_eq!(loaded, None);
        assert!(store.contains(DEFAULT_CACHE_KEY).await);
    }

    #[tokio::test]
    async fn test_load_future_version_is_discarded() {
        let store = MemoryStore::new();
        store
            .set(
                DEFAULT_CACHE_KEY,
                r#"{"version":2,"owner":"user-1","displayName":"Ada"}"#.into(),
            )
            .await
            .unwrap();
        let cache = ProfileCache::new(store.clone());

        assert_eq!(cache.load(&owner()).await.unwrap(), None);
        assert!(!store.contains(DEFAULT_CACHE_KEY).await);
    }

    #[tokio::test]
    async fn test_load_unversioned_legacy_blob_is_discarded() {
        let store = MemoryStore::new();
        store
            .set(
                DEFAULT_CACHE_KEY,
                r#"{"fullName":"Ada","email":"ada@x.com","phoneNumber":"1",
                    "companyName":"","isAgency":"Yes"}"#
                    .into(),
            )
            .await
            .unwrap();
        let cache = ProfileCache::new(store.clone());

        assert_eq!(cache.load(&owner()).await.unwrap(), None);
        assert!(!store.contains(DEFAULT_CACHE_KEY).await);
    }

    #[tokio::test]
    async fn test_load_garbage_is_discarded() {
        let store = MemoryStore::new();
        store.set(DEFAULT_CACHE_KEY, "not json".into()).await.unwrap();
        let cache = ProfileCache::new(store.clone());

        assert_eq!(cache.load(&owner()).await.unwrap(), None);
        assert!(!store.contains(DEFAULT_CACHE_KEY).await);
    }

    #[tokio::test]
    async fn test_clear_removes_entry_and_custom_key_is_used() {
        let store = MemoryStore::new();
        let cache = ProfileCache::new(store.clone()).with_key("profile");
        cache.save(&owner(), &ada()).await.unwrap();
        assert!(store.contains("profile").await);

        cache.clear().await.unwrap();

        assert!(!store.contains("profile").await);
        assert_eq!(cache.key(), "profile");
    }
}
