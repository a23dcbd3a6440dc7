//! Elevated account-management capability.
//!
//! Listing accounts and force-confirming one are administrative operations.
//! They are split out of [`IdentityClient`](crate::IdentityClient) so that a
//! deployment has to hand the reconciler an `AccountAdmin` explicitly. If it
//! doesn't, the confirmation workaround is simply unavailable and the
//! original sign-in error reaches the user.

use std::future::Future;
use std::sync::Arc;

use rapport_model::{Account, IdentityId};

use crate::IdentityError;

/// Administrative calls used by the login confirmation workaround.
pub trait AccountAdmin: Send + Sync + 'static {
    /// Lists the accounts known to the provider.
    fn list_accounts(
        &self,
    ) -> impl Future<Output = Result<Vec<Account>, IdentityError>> + Send;

    /// Marks the account's email as confirmed.
    fn force_confirm(
        &self,
        id: &IdentityId,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;
}

impl<T: AccountAdmin> AccountAdmin for Arc<T> {
    fn list_accounts(
        &self,
    ) -> impl Future<Output = Result<Vec<Account>, IdentityError>> + Send {
        (**self).list_accounts()
    }

    fn force_confirm(
        &self,
        id: &IdentityId,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send {
        (**self).force_confirm(id)
    }
}

/// The "no administrative capability" type.
///
/// An enum with no variants can never be constructed, so a reconciler typed
/// with `NoAdmin` provably never makes an elevated call. It's the default
/// type parameter of the reconciler until an admin is supplied.
#[derive(Debug, Clone, Copy)]
pub enum NoAdmin {}

impl AccountAdmin for NoAdmin {
    async fn list_accounts(&self) -> Result<Vec<Account>, IdentityError> {
        match *self {}
    }

    async fn force_confirm(&self, _id: &IdentityId) -> Result<(), IdentityError> {
        match *self {}
    }
}
