//! The login confirmation workaround.
//!
//! Some providers refuse to sign in an account whose email was never
//! confirmed, even when the product doesn't require confirmation. When an
//! [`AccountAdmin`] is available, login recovers by force-confirming the
//! account and signing in again:
//!
//! ```text
//! sign_in ──"email not confirmed"──► list_accounts ──► force_confirm ──► sign_in
//!                                         │                  │
//!                               fails / no match      fails: retry anyway
//!                                         ▼
//!                                 original error
//! ```
//!
//! Only that one error class enters this path. Wrong passwords and unknown
//! accounts fail as usual.

use rapport_cache::KeyValueStore;
use rapport_identity::{AccountAdmin, IdentityClient, IdentityError};
use rapport_model::Session;
use rapport_store::ProfileStore;

use crate::{Reconciler, SessionError};

impl<I, S, K, A> Reconciler<I, S, K, A>
where
    I: IdentityClient,
    S: ProfileStore,
    K: KeyValueStore,
    A: AccountAdmin,
{
    /// Attempts the workaround after `original` rejected the sign-in.
    ///
    /// If recovery can't get as far as a second sign-in, `original` is
    /// returned untouched so the root cause isn't masked.
    pub(crate) async fn recover_unconfirmed(
        &self,
        email: &str,
        password: &str,
        original: IdentityError,
    ) -> Result<Session, SessionError> {
        let admin = match &self.inner.admin {
            Some(admin) if self.inner.config.confirmation_workaround => admin,
            _ => {
                tracing::debug!("confirmation workaround unavailable");
                return Err(original.into());
            }
        };

        tracing::warn!(email, "sign-in blocked by unconfirmed email, attempting recovery");

        let accounts = match self
            .inner
            .calls
            .run("admin.list_accounts", admin.list_accounts())
            .await
        {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::warn!(error = %e, "could not list accounts, giving up recovery");
                return Err(original.into());
            }
        };

        let Some(account) = accounts.into_iter().find(|a| a.matches_email(email)) else {
            tracing::warn!(email, "no account matches, giving up recovery");
            return Err(original.into());
        };

        match self
            .inner
            .calls
            .run("admin.force_confirm", admin.force_confirm(&account.id))
            .await
        {
            Ok(()) => tracing::info!(identity_id = %account.id, "account force-confirmed"),
            Err(e) => tracing::warn!(
                identity_id = %account.id,
                error = %e,
                "force-confirm failed, retrying sign-in once"
            ),
        }

        self.sign_in(email, password).await.map_err(|last| {
            tracing::warn!(error = %last, "sign-in still failing after recovery");
            SessionError::RecoveryExhausted { original, last }
        })
    }
}
