//! Error types for profile store calls.

use rapport_model::{IdentityId, Interrupted};

/// Errors returned by [`ProfileStore`](crate::ProfileStore) calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileStoreError {
    /// No row exists for this identity.
    ///
    /// Not a failure: accounts created before profiles existed, or whose
    /// sign-up profile write failed, legitimately have no row. The
    /// reconciler falls back to the cache on this variant.
    #[error("no profile row for identity {0}")]
    NotFound(IdentityId),

    /// The store refused the request (constraint violation, permission
    /// policy, duplicate key...).
    #[error("profile store rejected the request: {0}")]
    Rejected(String),

    /// The store couldn't be reached or failed internally.
    #[error("profile store unavailable: {0}")]
    Unavailable(String),

    /// The call hit its deadline or was cancelled.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl ProfileStoreError {
    /// Returns `true` for the "no row" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
