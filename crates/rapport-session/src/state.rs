//! The owned container for the published state.
//!
//! One `watch` sender holds the current [`ReconciledState`]. The reconciler
//! is the only writer; everything else gets a read-only receiver from
//! [`StateContainer::subscribe`] and is woken whenever the state actually
//! changes.

use rapport_model::{IdentityId, ReconciledState};
use tokio::sync::watch;

/// Single source of truth for "who is signed in".
#[derive(Debug)]
pub struct StateContainer {
    tx: watch::Sender<ReconciledState>,
}

impl StateContainer {
    /// Starts empty and loading.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ReconciledState::new());
        Self { tx }
    }

    /// A clone of the current state.
    pub fn snapshot(&self) -> ReconciledState {
        self.tx.borrow().clone()
    }

    /// A receiver that observes every published change.
    pub fn subscribe(&self) -> watch::Receiver<ReconciledState> {
        self.tx.subscribe()
    }

    /// Whether `id` is the signed-in identity right now.
    pub(crate) fn holds_identity(&self, id: &IdentityId) -> bool {
        self.tx.borrow().identity().is_some_and(|i| i.id == *id)
    }

    /// Applies `mutate` atomically. Receivers are only notified if the
    /// state ended up different.
    ///
    /// Returns `true` if the state changed.
    pub(crate) fn update(&self, mutate: impl FnOnce(&mut ReconciledState)) -> bool {
        self.tx.send_if_modified(|state| {
            let before = state.clone();
            mutate(state);
            *state != before
        })
    }

    /// Sets `is_loading` and returns a guard that clears it when dropped.
    pub(crate) fn begin_loading(&self) -> LoadingGuard<'_> {
        self.update(|state| state.set_loading(true));
        LoadingGuard { state: self }
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears `is_loading` on drop, so early returns, errors and timeouts all
/// leave the flag down.
pub(crate) struct LoadingGuard<'a> {
    state: &'a StateContainer,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.update(|state| state.set_loading(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_loading() {
        let container = StateContainer::new();
        assert!(container.snapshot().is_loading());
    }

    #[test]
    fn test_holds_identity_follows_session() {
        use rapport_model::{Identity, Session};

        let container = StateContainer::new();
        let id = IdentityId::new("u-1");
        assert!(!container.holds_identity(&id));

        container.update(|state| {
            state.set_session(Some(Session {
                subject: Identity {
                    id: id.clone(),
                    email: "u-1@x.com".into(),
                    email_confirmed: true,
                },
                access_token: "t".into(),
                refresh_token: None,
                issued_at: 0,
                expires_at: None,
            }));
        });
        assert!(container.holds_identity(&id));
        assert!(!container.holds_identity(&IdentityId::new("u-2")));

        container.update(|state| {
            state.set_session(None);
        });
        assert!(!container.holds_identity(&id));
    }

    #[test]
    fn test_loading_guard_clears_flag_on_drop() {
        let container = StateContainer::new();
        {
            let _guard = container.begin_loading();
            assert!(container.snapshot().is_loading());
        }
        assert!(!container.snapshot().is_loading());
    }

    #[test]
    fn test_update_without_change_does_not_notify() {
        let container = StateContainer::new();
        let mut rx = container.subscribe();
        rx.mark_unchanged();

        let changed = container.update(|state| state.set_loading(true));

        assert!(!changed);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_update_with_change_notifies() {
        let container = StateContainer::new();
        let mut rx = container.subscribe();
        rx.mark_unchanged();

        let changed = container.update(|state| state.set_loading(false));

        assert!(changed);
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_loading());
    }
}
