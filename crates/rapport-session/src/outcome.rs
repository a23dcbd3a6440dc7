//! Success values and the non-fatal conditions they carry.

use rapport_cache::CacheError;
use rapport_identity::IdentityError;
use rapport_store::ProfileStoreError;

/// Something that went wrong without failing the operation.
#[derive(Debug, thiserror::Error)]
pub enum Warning {
    /// Sign-up created the identity but the profile row couldn't be
    /// written. The user is signed in with the submitted profile.
    #[error("profile row was not saved: {0}")]
    ProfileWriteFailed(ProfileStoreError),

    /// The local cache couldn't be written or cleared.
    #[error("local cache was not updated: {0}")]
    CacheWriteFailed(CacheError),

    /// The provider didn't confirm the sign-out. The local state was
    /// cleared anyway.
    #[error("remote sign-out failed: {0}")]
    RemoteSignOutFailed(IdentityError),
}

/// What a successful sign-up, login or logout reports back.
#[derive(Debug, Default)]
pub struct Outcome {
    pub warnings: Vec<Warning>,
    /// `true` when login only succeeded through the confirmation workaround.
    pub recovered: bool,
}

impl Outcome {
    /// No warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}
