//! Reconciler configuration.

use std::time::Duration;

use rapport_cache::DEFAULT_CACHE_KEY;
use serde::{Deserialize, Serialize};

/// Tunables for a [`Reconciler`](crate::Reconciler).
///
/// Build one with `Default` and the `with_*` methods:
///
/// ```rust
/// use std::time::Duration;
/// use rapport_session::ReconcilerConfig;
///
/// let config = ReconcilerConfig::default()
///     .with_call_timeout(Duration::from_secs(5))
///     .with_confirmation_workaround(false);
/// assert_eq!(config.cache_key, "popx_user");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Deadline for each individual collaborator call (identity provider,
    /// profile store, cache). A call that runs past it fails with
    /// [`Interrupted::TimedOut`](rapport_model::Interrupted::TimedOut).
    pub call_timeout: Duration,

    /// Key the profile cache blob is stored under.
    pub cache_key: String,

    /// Whether login may force-confirm an account whose sign-in was
    /// rejected as "email not confirmed". Has no effect unless an
    /// [`AccountAdmin`](rapport_identity::AccountAdmin) was supplied.
    pub confirmation_workaround: bool,
}

impl ReconcilerConfig {
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn with_confirmation_workaround(mut self, enabled: bool) -> Self {
        self.confirmation_workaround = enabled;
        self
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            confirmation_workaround: true,
        }
    }
}
