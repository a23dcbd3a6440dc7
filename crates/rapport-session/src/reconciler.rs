//! The reconciler: bootstrap, profile resolution, sign-up, login, logout.

use std::sync::Arc;

use rapport_cache::{CacheError, KeyValueStore, ProfileCache};
use rapport_identity::{AccountAdmin, IdentityClient, IdentityError, NoAdmin};
use rapport_model::{Identity, IdentityId, Profile, ProfileDraft, ProfileRow, ReconciledState, Session};
use rapport_store::ProfileStore;
use tokio::sync::{Mutex, watch};

use crate::guard::CallGuard;
use crate::listener::ListenerHandle;
use crate::{Outcome, ReconcilerConfig, SessionError, StateContainer, Warning};

pub(crate) struct Inner<I, S, K, A> {
    pub(crate) identity: I,
    pub(crate) store: S,
    pub(crate) cache: ProfileCache<K>,
    pub(crate) admin: Option<A>,
    pub(crate) config: ReconcilerConfig,
    pub(crate) state: StateContainer,
    pub(crate) calls: CallGuard,
    /// Held across every cache write and by logout's clear.
    pub(crate) cache_writes: Mutex<()>,
}

/// Keeps the published [`ReconciledState`] consistent with the identity
/// provider, the profile store and the local cache.
///
/// Cheap to clone; clones share the same state and collaborators. The
/// presentation layer reads state through [`Reconciler::subscribe`] or
/// [`Reconciler::state`] and never writes it.
///
/// # Example
///
/// ```rust,ignore
/// let reconciler = Reconciler::builder(identity, store, MemoryStore::new())
///     .account_admin(admin)
///     .build();
/// let _listener = reconciler.bootstrap().await;
/// reconciler.login("ada@x.com", "secret").await?;
/// ```
///
/// # Concurrency
///
/// User-initiated operations (sign-up, login, logout, refresh) are not meant
/// to overlap; the presentation layer serializes them with `is_loading`.
/// The bootstrap listener may call [`Reconciler::apply_session`] at any
/// time, which is safe because applying a session is idempotent and the
/// last write wins.
pub struct Reconciler<I, S, K, A = NoAdmin> {
    pub(crate) inner: Arc<Inner<I, S, K, A>>,
}

impl<I, S, K, A> Clone for Reconciler<I, S, K, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I, S, K> Reconciler<I, S, K>
where
    I: IdentityClient,
    S: ProfileStore,
    K: KeyValueStore,
{
    /// Starts building a reconciler without administrative capability.
    pub fn builder(identity: I, store: S, cache_store: K) -> ReconcilerBuilder<I, S, K> {
        ReconcilerBuilder::new(identity, store, cache_store)
    }
}

impl<I, S, K, A> Reconciler<I, S, K, A>
where
    I: IdentityClient,
    S: ProfileStore,
    K: KeyValueStore,
    A: AccountAdmin,
{
    /// A clone of the current published state.
    pub fn state(&self) -> ReconciledState {
        self.inner.state.snapshot()
    }

    /// A receiver woken on every change to the published state.
    pub fn subscribe(&self) -> watch::Receiver<ReconciledState> {
        self.inner.state.subscribe()
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.inner.config
    }

    /// Whether an [`AccountAdmin`] was supplied and the workaround is on.
    pub fn can_recover_unconfirmed(&self) -> bool {
        self.inner.admin.is_some() && self.inner.config.confirmation_workaround
    }

    // -----------------------------------------------------------------
    // Bootstrap
    // -----------------------------------------------------------------

    /// Restores the provider's current session and starts following its
    /// changes.
    ///
    /// Subscribes first, then reads the current session, so a change that
    /// lands between the two is not missed. Both paths feed
    /// [`Reconciler::apply_session`]. `is_loading` is cleared once the
    /// one-shot read's profile resolution has finished.
    ///
    /// Keep the returned handle alive for as long as the listener should
    /// run.
    pub async fn bootstrap(&self) -> ListenerHandle {
        let _loading = self.inner.state.begin_loading();

        let subscription = self.inner.identity.on_session_change();
        let listener = ListenerHandle::spawn(self.clone(), subscription);

        match self.current_session().await {
            Ok(session) => {
                tracing::debug!(restored = session.is_some(), "bootstrap session read");
                self.apply_session(session).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read current session at bootstrap");
            }
        }

        listener
    }

    /// Publishes `session` and resolves the profile that goes with it.
    ///
    /// If the session's subject differs from the identity published so far,
    /// the old profile is cleared before anything else happens. `None`
    /// publishes the signed-out state.
    pub async fn apply_session(&self, session: Option<Session>) {
        let subject = session.as_ref().map(|s| s.subject().clone());

        let mut subject_changed = false;
        self.inner.state.update(|state| {
            subject_changed = state.set_session(session);
        });

        match subject {
            Some(identity) => {
                if subject_changed {
                    tracing::info!(identity_id = %identity.id, "session applied");
                }
                self.resolve_profile(&identity).await;
            }
            None if subject_changed => tracing::info!("session cleared"),
            None => {}
        }
    }

    /// Re-runs profile resolution for the signed-in identity and returns
    /// the profile published afterwards. Does nothing when signed out.
    pub async fn refresh_profile(&self) -> Option<Profile> {
        let identity = self.inner.state.snapshot().identity().cloned()?;
        let _loading = self.inner.state.begin_loading();

        self.resolve_profile(&identity).await;
        self.inner.state.snapshot().profile().cloned()
    }

    // -----------------------------------------------------------------
    // Sign-up
    // -----------------------------------------------------------------

    /// Creates an account, writes its profile row and signs it in.
    ///
    /// A failed profile write does not fail the sign-up: the user is signed
    /// in with the submitted profile and [`Warning::ProfileWriteFailed`] is
    /// reported.
    ///
    /// # Errors
    /// - [`SessionError::InvalidInput`] for a blank email or password or an
    ///   incomplete draft; nothing is sent.
    /// - [`SessionError::Identity`] if the provider refuses the account.
    ///   Published state is unchanged.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        draft: &ProfileDraft,
    ) -> Result<Outcome, SessionError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SessionError::InvalidInput("email is required".into()));
        }
        if password.is_empty() {
            return Err(SessionError::InvalidInput("password is required".into()));
        }
        draft.validate().map_err(SessionError::InvalidInput)?;

        let _loading = self.inner.state.begin_loading();
        let response = self
            .inner
            .calls
            .run("identity.sign_up", self.inner.identity.sign_up(email, password))
            .await?;

        let identity_id = response.identity.id.clone();
        let mut outcome = Outcome::default();

        let row = ProfileRow::from_draft(identity_id.clone(), draft);
        if let Err(e) = self
            .inner
            .calls
            .run("store.insert", self.inner.store.insert(row))
            .await
        {
            tracing::warn!(%identity_id, error = %e, "profile write failed, continuing sign-up");
            outcome.warn(Warning::ProfileWriteFailed(e));
        }

        let profile = Profile::from_draft(draft, &response.identity.email);
        self.inner.state.update(|state| {
            state.set_session(Some(response.session));
            state.set_profile(Some(profile.clone()));
        });

        if let Err(e) = self.save_cached(&identity_id, &profile).await {
            outcome.warn(Warning::CacheWriteFailed(e));
        }

        tracing::info!(%identity_id, "signed up");
        Ok(outcome)
    }

    // -----------------------------------------------------------------
    // Login
    // -----------------------------------------------------------------

    /// Signs in and resolves the profile.
    ///
    /// An "email not confirmed" rejection triggers the confirmation
    /// workaround when it's available; [`Outcome::recovered`] reports
    /// whether it was used.
    ///
    /// # Errors
    /// - [`SessionError::Identity`] for any rejection outside the
    ///   workaround, and for "email not confirmed" when recovery couldn't
    ///   start (no admin, listing failed, no matching account).
    /// - [`SessionError::RecoveryExhausted`] when the retried sign-in failed.
    pub async fn login(&self, email: &str, password: &str) -> Result<Outcome, SessionError> {
        let _loading = self.inner.state.begin_loading();
        let email = email.trim();

        let (session, recovered) = match self.sign_in(email, password).await {
            Ok(session) => (session, false),
            Err(original) if original.is_email_not_confirmed() => {
                let session = self.recover_unconfirmed(email, password, original).await?;
                (session, true)
            }
            Err(e) => {
                tracing::debug!(error = %e, "sign-in rejected");
                return Err(e.into());
            }
        };

        tracing::info!(identity_id = %session.subject().id, recovered, "signed in");
        self.apply_session(Some(session)).await;

        Ok(Outcome {
            recovered,
            ..Outcome::default()
        })
    }

    // -----------------------------------------------------------------
    // Logout
    // -----------------------------------------------------------------

    /// Signs out and clears the local state and cache.
    ///
    /// Never fails: afterwards nobody is signed in locally, whatever the
    /// provider said. A failed remote sign-out is reported as
    /// [`Warning::RemoteSignOutFailed`].
    pub async fn logout(&self) -> Outcome {
        let _loading = self.inner.state.begin_loading();
        let mut outcome = Outcome::default();

        if let Err(e) = self
            .inner
            .calls
            .run("identity.sign_out", self.inner.identity.sign_out())
            .await
        {
            tracing::warn!(error = %e, "remote sign-out failed, clearing local state anyway");
            outcome.warn(Warning::RemoteSignOutFailed(e));
        }

        self.inner.state.update(|state| {
            state.set_session(None);
        });

        // State is already signed out, so a write that takes the lock after
        // us sees no owner and skips; one holding it finishes first.
        let cleared = {
            let _writes = self.inner.cache_writes.lock().await;
            self.inner
                .calls
                .run_local("cache.clear", self.inner.cache.clear())
                .await
        };
        if let Err(e) = cleared {
            tracing::warn!(error = %e, "could not clear cached profile");
            outcome.warn(Warning::CacheWriteFailed(e));
        }

        tracing::info!("signed out");
        outcome
    }

    /// Cancels every in-flight collaborator call and stops the bootstrap
    /// listener. Later calls fail immediately as cancelled, except logout's
    /// local cache clear.
    pub fn shutdown(&self) {
        if !self.inner.calls.is_cancelled() {
            tracing::info!("reconciler shutting down");
        }
        self.inner.calls.cancel();
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    pub(crate) async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        self.inner
            .calls
            .run("identity.current_session", self.inner.identity.current_session())
            .await
    }

    pub(crate) async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        self.inner
            .calls
            .run("identity.sign_in", self.inner.identity.sign_in(email, password))
            .await
    }

    /// Fetches the remote profile for `identity` and publishes it, falling
    /// back to what's already published, then to the cache.
    ///
    /// Never fails; store and cache errors are logged and absorbed.
    async fn resolve_profile(&self, identity: &Identity) {
        let fetched = self
            .inner
            .calls
            .run("store.get_by_identity_id", self.inner.store.get_by_identity_id(&identity.id))
            .await;

        match fetched {
            Ok(row) => {
                let profile = Profile::from_row(&row, &identity.email);
                if self.publish_profile(&identity.id, profile.clone()) {
                    // Logged inside.
                    let _ = self.save_cached(&identity.id, &profile).await;
                }
            }
            Err(e) => {
                if e.is_not_found() {
                    tracing::debug!(identity_id = %identity.id, "no remote profile row");
                } else {
                    tracing::warn!(identity_id = %identity.id, error = %e, "profile fetch failed");
                }

                let current = self.inner.state.snapshot();
                let holds_profile = current.profile().is_some()
                    && current.identity().is_some_and(|i| i.id == identity.id);
                if holds_profile {
                    tracing::debug!(identity_id = %identity.id, "keeping published profile");
                    return;
                }

                match self
                    .inner
                    .calls
                    .run("cache.load", self.inner.cache.load(&identity.id))
                    .await
                {
                    Ok(Some(profile)) => {
                        tracing::debug!(identity_id = %identity.id, "profile restored from cache");
                        self.publish_profile(&identity.id, profile);
                    }
                    Ok(None) => {
                        tracing::debug!(identity_id = %identity.id, "no cached profile");
                    }
                    Err(e) => {
                        tracing::warn!(identity_id = %identity.id, error = %e, "cache read failed");
                    }
                }
            }
        }
    }

    /// Publishes `profile` if `owner` is still the signed-in identity.
    ///
    /// A resolution that finishes after the session moved on to someone
    /// else (or signed out) must not publish.
    fn publish_profile(&self, owner: &IdentityId, profile: Profile) -> bool {
        let mut published = false;
        self.inner.state.update(|state| {
            if state.identity().is_some_and(|i| i.id == *owner) {
                published = state.set_profile(Some(profile));
            }
        });
        if !published {
            tracing::debug!(identity_id = %owner, "identity changed during resolution, profile dropped");
        }
        published
    }

    /// Writes `profile` to the cache if `owner` is still signed in.
    async fn save_cached(&self, owner: &IdentityId, profile: &Profile) -> Result<(), CacheError> {
        let _writes = self.inner.cache_writes.lock().await;
        if !self.inner.state.holds_identity(owner) {
            tracing::debug!(identity_id = %owner, "identity changed before cache write, skipped");
            return Ok(());
        }

        self.inner
            .calls
            .run("cache.save", self.inner.cache.save(owner, profile))
            .await
            .inspect_err(|e| {
                tracing::warn!(identity_id = %owner, error = %e, "could not cache profile");
            })
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`Reconciler`].
///
/// The administrative capability is opt-in: without
/// [`ReconcilerBuilder::account_admin`] the reconciler is typed with
/// [`NoAdmin`] and can never make an elevated call.
pub struct ReconcilerBuilder<I, S, K, A = NoAdmin> {
    identity: I,
    store: S,
    cache_store: K,
    admin: Option<A>,
    config: ReconcilerConfig,
}

impl<I, S, K> ReconcilerBuilder<I, S, K>
where
    I: IdentityClient,
    S: ProfileStore,
    K: KeyValueStore,
{
    pub fn new(identity: I, store: S, cache_store: K) -> Self {
        Self {
            identity,
            store,
            cache_store,
            admin: None,
            config: ReconcilerConfig::default(),
        }
    }
}

impl<I, S, K, A> ReconcilerBuilder<I, S, K, A>
where
    I: IdentityClient,
    S: ProfileStore,
    K: KeyValueStore,
    A: AccountAdmin,
{
    /// Supplies the elevated capability used by the login confirmation
    /// workaround.
    pub fn account_admin<B: AccountAdmin>(self, admin: B) -> ReconcilerBuilder<I, S, K, B> {
        ReconcilerBuilder {
            identity: self.identity,
            store: self.store,
            cache_store: self.cache_store,
            admin: Some(admin),
            config: self.config,
        }
    }

    pub fn config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Reconciler<I, S, K, A> {
        let cache = ProfileCache::new(self.cache_store).with_key(self.config.cache_key.clone());
        let calls = CallGuard::new(self.config.call_timeout);

        Reconciler {
            inner: Arc::new(Inner {
                identity: self.identity,
                store: self.store,
                cache,
                admin: self.admin,
                config: self.config,
                state: StateContainer::new(),
                calls,
                cache_writes: Mutex::new(()),
            }),
        }
    }
}
