//! Scripted collaborators for reconciler integration tests.
//!
//! Each mock records how often it was called and answers from a script the
//! test sets up front. `std::sync::Mutex` is fine here: no lock is held
//! across an `.await`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rapport_cache::{CacheError, KeyValueStore, MemoryStore};
use rapport_identity::{
    AccountAdmin, ErrorCode, IdentityClient, IdentityError, SessionBroadcaster,
    SessionSubscription, SignUpResponse,
};
use rapport_model::{Account, AgencyFlag, Identity, IdentityId, ProfileDraft, ProfileRow, Session};
use rapport_session::{Reconciler, ReconcilerConfig};
use rapport_store::{ProfileStore, ProfileStoreError};

// -- Fixtures -----------------------------------------------------------

pub fn identity(id: &str) -> Identity {
    Identity {
        id: IdentityId::new(id),
        email: format!("{id}@x.com"),
        email_confirmed: true,
    }
}

pub fn session(id: &str) -> Session {
    Session {
        subject: identity(id),
        access_token: format!("token-{id}"),
        refresh_token: None,
        issued_at: 0,
        expires_at: None,
    }
}

pub fn row(id: &str, full_name: &str) -> ProfileRow {
    ProfileRow {
        id: IdentityId::new(id),
        full_name: Some(full_name.into()),
        phone_number: Some("555-0100".into()),
        company_name: None,
        is_agency: Some("No".into()),
        created_at: None,
        updated_at: None,
    }
}

pub fn draft() -> ProfileDraft {
    ProfileDraft {
        full_name: "Ada Lovelace".into(),
        phone_number: "555-0100".into(),
        company_name: Some("Engines Ltd".into()),
        is_agency: AgencyFlag::Yes,
    }
}

pub fn unconfirmed() -> IdentityError {
    IdentityError::rejected(ErrorCode::EMAIL_NOT_CONFIRMED, "Email not confirmed")
}

pub fn bad_credentials() -> IdentityError {
    IdentityError::rejected(ErrorCode::INVALID_CREDENTIALS, "Invalid login credentials")
}

pub fn account(id: &str) -> Account {
    Account {
        id: IdentityId::new(id),
        email: format!("{id}@x.com"),
        email_confirmed: false,
    }
}

// -- Identity -------------------------------------------------------------

/// Identity client whose answers are queued by the test.
#[derive(Default)]
pub struct ScriptedIdentity {
    pub sign_in_results: Mutex<VecDeque<Result<Session, IdentityError>>>,
    pub sign_up_result: Mutex<Option<Result<SignUpResponse, IdentityError>>>,
    pub sign_out_result: Mutex<Option<IdentityError>>,
    pub current: Mutex<Option<Session>>,
    /// When set, `sign_in` never resolves.
    pub hang_sign_in: Mutex<bool>,
    pub events: SessionBroadcaster,
    pub sign_in_calls: AtomicUsize,
    pub sign_up_calls: AtomicUsize,
    pub current_session_calls: AtomicUsize,
}

impl ScriptedIdentity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_events(events: SessionBroadcaster) -> Arc<Self> {
        Arc::new(Self {
            events,
            ..Self::default()
        })
    }

    pub fn push_sign_in(&self, result: Result<Session, IdentityError>) {
        self.sign_in_results.lock().unwrap().push_back(result);
    }

    pub fn set_sign_up(&self, result: Result<SignUpResponse, IdentityError>) {
        *self.sign_up_result.lock().unwrap() = Some(result);
    }

    pub fn fail_sign_out(&self, error: IdentityError) {
        *self.sign_out_result.lock().unwrap() = Some(error);
    }

    pub fn set_current(&self, session: Option<Session>) {
        *self.current.lock().unwrap() = session;
    }

    pub fn hang_sign_in(&self) {
        *self.hang_sign_in.lock().unwrap() = true;
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn current_session_calls(&self) -> usize {
        self.current_session_calls.load(Ordering::SeqCst)
    }
}

impl IdentityClient for ScriptedIdentity {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, IdentityError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let hang = *self.hang_sign_in.lock().unwrap();
        if hang {
            std::future::pending::<()>().await;
        }
        self.sign_in_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(bad_credentials()))
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<SignUpResponse, IdentityError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_up_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(IdentityError::Unavailable("no script".into())))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        match self.sign_out_result.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        self.current_session_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.current.lock().unwrap().clone())
    }

    fn on_session_change(&self) -> SessionSubscription {
        self.events.subscribe()
    }
}

// -- Admin ----------------------------------------------------------------

/// Account admin with scripted listing and force-confirm results.
pub struct ScriptedAdmin {
    pub accounts: Mutex<Result<Vec<Account>, IdentityError>>,
    pub confirm_result: Mutex<Result<(), IdentityError>>,
    pub list_calls: AtomicUsize,
    pub confirmed: Mutex<Vec<IdentityId>>,
}

impl ScriptedAdmin {
    pub fn new(accounts: Vec<Account>) -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(Ok(accounts)),
            confirm_result: Mutex::new(Ok(())),
            list_calls: AtomicUsize::new(0),
            confirmed: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_list(error: IdentityError) -> Arc<Self> {
        let admin = Self::new(Vec::new());
        *admin.accounts.lock().unwrap() = Err(error);
        admin
    }

    pub fn fail_confirm(&self, error: IdentityError) {
        *self.confirm_result.lock().unwrap() = Err(error);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn confirmed(&self) -> Vec<IdentityId> {
        self.confirmed.lock().unwrap().clone()
    }
}

impl AccountAdmin for ScriptedAdmin {
    async fn list_accounts(&self) -> Result<Vec<Account>, IdentityError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.accounts.lock().unwrap().clone()
    }

    async fn force_confirm(&self, id: &IdentityId) -> Result<(), IdentityError> {
        self.confirmed.lock().unwrap().push(id.clone());
        self.confirm_result.lock().unwrap().clone()
    }
}

// -- Profile store --------------------------------------------------------

/// What `get_by_identity_id` answers.
#[derive(Debug, Clone)]
pub enum Fetch {
    Row(ProfileRow),
    NotFound,
    Fail(String),
    Hang,
}

/// Profile store whose reads and writes are scripted.
pub struct ScriptedStore {
    pub fetch: Mutex<Fetch>,
    pub insert_error: Mutex<Option<ProfileStoreError>>,
    pub inserted: Mutex<Vec<ProfileRow>>,
    pub get_calls: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(fetch: Fetch) -> Arc<Self> {
        Arc::new(Self {
            fetch: Mutex::new(fetch),
            insert_error: Mutex::new(None),
            inserted: Mutex::new(Vec::new()),
            get_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_fetch(&self, fetch: Fetch) {
        *self.fetch.lock().unwrap() = fetch;
    }

    pub fn fail_insert(&self, error: ProfileStoreError) {
        *self.insert_error.lock().unwrap() = Some(error);
    }

    pub fn inserted(&self) -> Vec<ProfileRow> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

impl ProfileStore for ScriptedStore {
    async fn get_by_identity_id(&self, id: &IdentityId) -> Result<ProfileRow, ProfileStoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let fetch = self.fetch.lock().unwrap().clone();
        match fetch {
            Fetch::Row(row) => Ok(row),
            Fetch::NotFound => Err(ProfileStoreError::NotFound(id.clone())),
            Fetch::Fail(reason) => Err(ProfileStoreError::Unavailable(reason)),
            Fetch::Hang => std::future::pending().await,
        }
    }

    async fn insert(&self, row: ProfileRow) -> Result<(), ProfileStoreError> {
        if let Some(e) = self.insert_error.lock().unwrap().clone() {
            return Err(e);
        }
        self.inserted.lock().unwrap().push(row);
        Ok(())
    }
}

// -- Cache ----------------------------------------------------------------

/// Memory cache whose writes take `delay` before landing.
#[derive(Clone)]
pub struct SlowSetStore {
    pub inner: MemoryStore,
    pub delay: Duration,
}

impl SlowSetStore {
    pub fn new(inner: MemoryStore, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl KeyValueStore for SlowSetStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        tokio::time::sleep(self.delay).await;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.inner.remove(key).await
    }
}

/// Cache whose writes and removals always fail.
#[derive(Clone, Default)]
pub struct BrokenCache;

impl KeyValueStore for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String) -> Result<(), CacheError> {
        Err(CacheError::Io(std::io::Error::other("disk full")))
    }

    async fn remove(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Io(std::io::Error::other("disk full")))
    }
}

// -- Wiring ---------------------------------------------------------------

pub type TestReconciler =
    Reconciler<Arc<ScriptedIdentity>, Arc<ScriptedStore>, MemoryStore, Arc<ScriptedAdmin>>;

pub type PlainReconciler = Reconciler<Arc<ScriptedIdentity>, Arc<ScriptedStore>, MemoryStore>;

/// A reconciler without administrative capability.
pub fn plain(identity: &Arc<ScriptedIdentity>, store: &Arc<ScriptedStore>, cache: &MemoryStore) -> PlainReconciler {
    Reconciler::builder(Arc::clone(identity), Arc::clone(store), cache.clone()).build()
}

/// A reconciler with `admin` and the given config.
pub fn with_admin(
    identity: &Arc<ScriptedIdentity>,
    store: &Arc<ScriptedStore>,
    cache: &MemoryStore,
    admin: &Arc<ScriptedAdmin>,
    config: ReconcilerConfig,
) -> TestReconciler {
    Reconciler::builder(Arc::clone(identity), Arc::clone(store), cache.clone())
        .account_admin(Arc::clone(admin))
        .config(config)
        .build()
}
