//! The bootstrap listener task.
//!
//! Feeds every session change notification into
//! [`Reconciler::apply_session`]. If the subscription lags and events were
//! dropped, the listener re-reads the current session instead of guessing
//! which of the missed events mattered.

use rapport_cache::KeyValueStore;
use rapport_identity::{AccountAdmin, IdentityClient, SessionChange, SessionSubscription};
use rapport_store::ProfileStore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::Reconciler;

/// Keeps the bootstrap listener running.
///
/// Dropping the handle (or calling [`ListenerHandle::stop`]) ends the
/// listener and with it the provider subscription.
#[derive(Debug)]
pub struct ListenerHandle {
    stop: CancellationToken,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub(crate) fn spawn<I, S, K, A>(
        reconciler: Reconciler<I, S, K, A>,
        subscription: SessionSubscription,
    ) -> Self
    where
        I: IdentityClient,
        S: ProfileStore,
        K: KeyValueStore,
        A: AccountAdmin,
    {
        let stop = reconciler.inner.calls.child_token();
        let task = tokio::spawn(listen(reconciler, subscription, stop.clone()));
        Self { stop, task }
    }

    /// Stops the listener and waits for it to exit.
    pub async fn stop(mut self) {
        self.stop.cancel();
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(error = %e, "session listener ended abnormally");
        }
    }

    /// `true` once the listener has exited (stopped, shut down, or the
    /// provider closed its notifications).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

async fn listen<I, S, K, A>(
    reconciler: Reconciler<I, S, K, A>,
    mut subscription: SessionSubscription,
    stop: CancellationToken,
) where
    I: IdentityClient,
    S: ProfileStore,
    K: KeyValueStore,
    A: AccountAdmin,
{
    tracing::debug!("session listener started");

    loop {
        let change = tokio::select! {
            () = stop.cancelled() => break,
            change = subscription.next() => change,
        };

        match change {
            Some(SessionChange::Event(event)) => {
                tracing::debug!(kind = ?event.kind, "session change received");
                reconciler.apply_session(event.session).await;
            }
            Some(SessionChange::Lagged(skipped)) => {
                tracing::warn!(skipped, "missed session changes, re-reading current session");
                match reconciler.current_session().await {
                    Ok(session) => reconciler.apply_session(session).await,
                    Err(e) => tracing::warn!(error = %e, "could not re-read current session"),
                }
            }
            None => {
                tracing::debug!("provider closed session notifications");
                break;
            }
        }
    }

    tracing::debug!("session listener stopped");
}
