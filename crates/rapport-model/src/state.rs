//! The published `(session, identity, profile)` tuple.

use crate::{Identity, Profile, Session};

/// What the presentation layer sees: who is signed in, their profile, and
/// whether an operation is in flight.
///
/// The fields are private so the invariants can't be broken from outside:
///
/// - `is_authenticated() == session().is_some()`, always.
/// - `identity()` is the session's subject; both are set or cleared together.
/// - A profile is only ever held while authenticated, and it is dropped when
///   the session's subject changes to a different identity.
///
/// `profile()` may be `None` while authenticated. That means "signed in,
/// profile pending or unavailable" and is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledState {
    session: Option<Session>,
    identity: Option<Identity>,
    profile: Option<Profile>,
    is_authenticated: bool,
    is_loading: bool,
}

impl ReconciledState {
    /// The state at process start: nobody signed in, still loading.
    pub fn new() -> Self {
        Self {
            session: None,
            identity: None,
            profile: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Replaces the session wholesale and derives identity and
    /// authentication from it.
    ///
    /// If the new subject is a different identity than the one currently
    /// published (or there is no new session at all), the current profile
    /// is cleared because it belongs to someone else.
    ///
    /// Returns `true` if the subject changed.
    pub fn set_session(&mut self, session: Option<Session>) -> bool {
        let next_identity = session.as_ref().map(|s| s.subject().clone());
        let subject_changed = match (&self.identity, &next_identity) {
            (Some(prev), Some(next)) => prev.id != next.id,
            (None, None) => false,
            _ => true,
        };

        if subject_changed || next_identity.is_none() {
            self.profile = None;
        }

        self.is_authenticated = session.is_some();
        self.identity = next_identity;
        self.session = session;
        subject_changed
    }

    /// Sets or clears the profile.
    ///
    /// Setting a profile while unauthenticated is ignored and returns
    /// `false`; a profile without an identity has no owner.
    pub fn set_profile(&mut self, profile: Option<Profile>) -> bool {
        if profile.is_some() && !self.is_authenticated {
            return false;
        }
        self.profile = profile;
        true
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }
}

/// Same as [`ReconciledState::new`]: empty and loading.
impl Default for ReconciledState {
    fn default() -> Self {
        Self::new()
    }
}
