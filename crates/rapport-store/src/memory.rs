//! In-process profile store.

use std::collections::HashMap;
use std::sync::Arc;

use rapport_model::{IdentityId, ProfileRow};
use tokio::sync::RwLock;

use crate::{ProfileStore, ProfileStoreError};

/// Profile rows in a `HashMap`, behind an async `RwLock`.
///
/// Cheap to clone; clones share the same rows. Inserting a row whose id
/// already exists is rejected, like a primary-key violation would be.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    rows: Arc<RwLock<HashMap<IdentityId, ProfileRow>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces (or creates) a row, bypassing the duplicate check.
    ///
    /// Stands in for edits made to the remote row by some other client.
    pub async fn upsert(&self, row: ProfileRow) {
        self.rows.write().await.insert(row.id.clone(), row);
    }

    /// Removes a row, returning it if it existed.
    pub async fn remove(&self, id: &IdentityId) -> Option<ProfileRow> {
        self.rows.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn get_by_identity_id(&self, id: &IdentityId) -> Result<ProfileRow, ProfileStoreError> {
        self.rows
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ProfileStoreError::NotFound(id.clone()))
    }

    async fn insert(&self, row: ProfileRow) -> Result<(), ProfileStoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&row.id) {
            return Err(ProfileStoreError::Rejected(format!(
                "duplicate key: profile {} already exists",
                row.id
            )));
        }
        tracing::debug!(identity_id = %row.id, "memory store: row inserted");
        rows.insert(row.id.clone(), row);
        Ok(())
    }
}
