//! The regular (non-privileged) identity client contract.
//!
//! This is the seam between Rapport and your identity provider (Supabase,
//! Auth0, Firebase, a custom service...). You implement [`IdentityClient`]
//! over your provider's SDK or HTTP API, and the reconciler calls it.
//!
//! # Why a trait?
//!
//! The reconciler's policies (cache fallback, confirmation workaround,
//! logout guarantee) don't depend on which provider is behind them. With a
//! trait we can run the same reconciler against a real provider in
//! production, [`MemoryIdentityProvider`](crate::MemoryIdentityProvider) in
//! development, and scripted mocks in tests.

use std::future::Future;
use std::sync::Arc;

use rapport_model::{Identity, Session};

use crate::{IdentityError, SessionSubscription};

/// What a successful sign-up returns: the new account and its first session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpResponse {
    pub identity: Identity,
    pub session: Session,
}

/// Calls a regular client session can make against the identity provider.
///
/// # Trait bounds
///
/// - `Send + Sync` → the reconciler shares the client between its listener
///   task and the caller's operations.
/// - `'static` → it lives as long as the reconciler.
///
/// Every method returns a `Send` future so the reconciler's own futures stay
/// `Send` and can be spawned on a multi-threaded runtime. Implementations may
/// simply write `async fn`.
pub trait IdentityClient: Send + Sync + 'static {
    /// Signs in with email and password and returns the new session.
    ///
    /// # Errors
    /// `IdentityError::Rejected` with the provider's code when the
    /// credentials or the account state are not acceptable.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, IdentityError>> + Send;

    /// Creates an account and returns it together with its session.
    ///
    /// # Errors
    /// `IdentityError::Rejected` for duplicate emails, weak passwords, etc.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<SignUpResponse, IdentityError>> + Send;

    /// Ends the current session at the provider.
    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// One-shot read of the session the provider currently holds (e.g. one
    /// restored from the provider's own storage), or `None`.
    fn current_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, IdentityError>> + Send;

    /// Subscribes to session change notifications.
    ///
    /// Dropping the returned subscription (or calling
    /// [`SessionSubscription::unsubscribe`]) ends it.
    fn on_session_change(&self) -> SessionSubscription;
}

/// Shared clients work too: `Arc<MyClient>` is an `IdentityClient`, so a
/// caller can keep a handle to the same client the reconciler owns.
impl<T: IdentityClient> IdentityClient for Arc<T> {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, IdentityError>> + Send {
        (**self).sign_in(email, password)
    }

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<SignUpResponse, IdentityError>> + Send {
        (**self).sign_up(email, password)
    }

    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send {
        (**self).sign_out()
    }

    fn current_session(
        &self,
    ) -> impl Future<Output = Result<Option<Session>, IdentityError>> + Send {
        (**self).current_session()
    }

    fn on_session_change(&self) -> SessionSubscription {
        (**self).on_session_change()
    }
}
