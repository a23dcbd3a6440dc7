//! Errors surfaced by reconciler operations.

use rapport_identity::IdentityError;

/// Why a sign-up or login failed.
///
/// Profile store and cache failures never appear here: the reconciler
/// absorbs them (see [`Warning`](crate::Warning)). Only identity failures
/// the user has to act on, and input the reconciler refused to send, reach
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The identity provider rejected the request or couldn't be reached.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Sign-in failed as "email not confirmed", the account was located and
    /// the confirmation workaround ran, and the retried sign-in still failed.
    ///
    /// Displays as `last`, the retry's error.
    #[error("{last}")]
    RecoveryExhausted {
        /// The sign-in error that triggered recovery.
        original: IdentityError,
        /// The error from the retried sign-in.
        last: IdentityError,
    },

    /// The request was refused before any remote call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SessionError {
    /// The identity error to show the user, if one is involved.
    ///
    /// For [`SessionError::RecoveryExhausted`] that's the retry's error,
    /// since it reflects the account's state after recovery.
    pub fn surfaced(&self) -> Option<&IdentityError> {
        match self {
            Self::Identity(e) => Some(e),
            Self::RecoveryExhausted { last, .. } => Some(last),
            Self::InvalidInput(_) => None,
        }
    }
}
