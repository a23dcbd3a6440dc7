//! Deadline and cancellation for collaborator calls.

use std::future::Future;
use std::time::Duration;

use rapport_model::Interrupted;
use tokio_util::sync::CancellationToken;

/// Runs collaborator calls under the configured deadline and the
/// reconciler's shutdown token.
#[derive(Debug, Clone)]
pub(crate) struct CallGuard {
    timeout: Duration,
    shutdown: CancellationToken,
}

impl CallGuard {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            shutdown: CancellationToken::new(),
        }
    }

    /// Awaits `call`, or resolves to [`Interrupted`] if the deadline passes
    /// or the reconciler shuts down first. The call's future is dropped in
    /// either case.
    pub(crate) async fn run<T, E, F>(&self, op: &'static str, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<Interrupted>,
    {
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => {
                tracing::debug!(op, "call cancelled");
                Err(Interrupted::Cancelled { op }.into())
            }
            result = self.run_local(op, call) => result,
        }
    }

    /// Awaits `call` under the deadline only. Shutdown does not interrupt
    /// it, so local cleanup still completes after [`CallGuard::cancel`].
    pub(crate) async fn run_local<T, E, F>(&self, op: &'static str, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<Interrupted>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(op, after = ?self.timeout, "call timed out");
                Err(Interrupted::TimedOut { op, after: self.timeout }.into())
            }
        }
    }

    /// A token that fires when the reconciler shuts down, or earlier if
    /// cancelled on its own.
    pub(crate) fn child_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub(crate) fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
