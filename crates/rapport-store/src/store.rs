//! The `ProfileStore` trait.

use std::future::Future;
use std::sync::Arc;

use rapport_model::{IdentityId, ProfileRow};

use crate::ProfileStoreError;

/// Keyed access to remote profile rows.
///
/// Same shape as the identity traits: `Send + Sync + 'static`, and every
/// method returns a `Send` future. Implementations may write `async fn`.
pub trait ProfileStore: Send + Sync + 'static {
    /// Fetches the row for `id`.
    ///
    /// # Errors
    /// - [`ProfileStoreError::NotFound`] — no row for this identity
    /// - anything else — the lookup itself failed
    fn get_by_identity_id(
        &self,
        id: &IdentityId,
    ) -> impl Future<Output = Result<ProfileRow, ProfileStoreError>> + Send;

    /// Inserts a new row.
    ///
    /// # Errors
    /// [`ProfileStoreError::Rejected`] if a row with this id already exists.
    fn insert(
        &self,
        row: ProfileRow,
    ) -> impl Future<Output = Result<(), ProfileStoreError>> + Send;
}

impl<T: ProfileStore> ProfileStore for Arc<T> {
    fn get_by_identity_id(
        &self,
        id: &IdentityId,
    ) -> impl Future<Output = Result<ProfileRow, ProfileStoreError>> + Send {
        (**self).get_by_identity_id(id)
    }

    fn insert(
        &self,
        row: ProfileRow,
    ) -> impl Future<Output = Result<(), ProfileStoreError>> + Send {
        (**self).insert(row)
    }
}
