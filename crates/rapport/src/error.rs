//! Unified error type for Rapport.

use rapport_cache::CacheError;
use rapport_identity::IdentityError;
use rapport_model::CodecError;
use rapport_session::SessionError;
use rapport_store::ProfileStoreError;

/// Top-level error that wraps every crate-specific error.
///
/// Application code built on the `rapport` crate can use this one type and
/// let `?` convert the others.
#[derive(Debug, thiserror::Error)]
pub enum RapportError {
    /// A sign-up, login or recovery failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A direct identity provider call failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A direct profile store call failed.
    #[error(transparent)]
    Store(#[from] ProfileStoreError),

    /// Local cache I/O or decoding failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A value couldn't be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl RapportError {
    /// The identity error to show the user, if this is one.
    pub fn surfaced(&self) -> Option<&IdentityError> {
        match self {
            Self::Session(e) => e.surfaced(),
            Self::Identity(e) => Some(e),
            _ => None,
        }
    }
}
