//! Deadline and cancellation outcomes for collaborator calls.

use std::time::Duration;

/// Why a collaborator call didn't produce a result.
///
/// Every remote or I/O call the reconciler makes runs under a deadline and a
/// cancellation token. When either fires, the call resolves to this value,
/// which each collaborator error type converts from (`#[from]`), so the
/// reconciler can apply the same absorb-or-surface rules it applies to any
/// other failure of that collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    /// The call ran past its deadline.
    #[error("{op} timed out after {after:?}")]
    TimedOut {
        /// Name of the collaborator call, e.g. `"identity.sign_in"`.
        op: &'static str,
        after: Duration,
    },

    /// The reconciler was shut down while the call was in flight.
    #[error("{op} was cancelled")]
    Cancelled { op: &'static str },
}

impl Interrupted {
    /// The collaborator call that was interrupted.
    pub fn op(&self) -> &'static str {
        match self {
            Self::TimedOut { op, .. } | Self::Cancelled { op } => op,
        }
    }
}
