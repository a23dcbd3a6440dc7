//! In-process identity provider for development and tests.
//!
//! `MemoryIdentityProvider` keeps accounts in a `HashMap`, mints random
//! access tokens, and publishes change notifications like a real provider.
//! It can be told to reject unconfirmed accounts at sign-in, which is exactly
//! the provider behaviour the login confirmation workaround exists for.
//!
//! Passwords are held in memory as given. This is a stand-in for a remote
//! provider, never a credential store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use rapport_model::{Account, Identity, IdentityId, Session};
use tokio::sync::Mutex;

use crate::{
    AccountAdmin, AuthChangeKind, ErrorCode, IdentityClient, IdentityError,
    SessionBroadcaster, SessionEvent, SessionSubscription, SignUpResponse,
};

/// Shortest password the provider accepts.
const MIN_PASSWORD_LEN: usize = 6;

/// Default access-token lifetime (one hour).
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

struct AccountRecord {
    identity: Identity,
    password: String,
}

#[derive(Default)]
struct ProviderState {
    /// Accounts keyed by lowercased email.
    accounts: HashMap<String, AccountRecord>,
    current: Option<Session>,
    next_id: u64,
}

/// An identity provider that lives entirely in memory.
///
/// Cheap to clone: clones share the same accounts, current session and
/// subscribers. It implements both [`IdentityClient`] and [`AccountAdmin`].
#[derive(Clone)]
pub struct MemoryIdentityProvider {
    state: Arc<Mutex<ProviderState>>,
    events: SessionBroadcaster,
    confirmation_required: bool,
    session_ttl_secs: u64,
}

impl MemoryIdentityProvider {
    /// A provider that lets unconfirmed accounts sign in.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState::default())),
            events: SessionBroadcaster::new(),
            confirmation_required: false,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }

    /// When `true`, new accounts start unconfirmed and sign-in rejects them
    /// with [`ErrorCode::EMAIL_NOT_CONFIRMED`].
    pub fn with_confirmation_required(mut self, required: bool) -> Self {
        self.confirmation_required = required;
        self
    }

    pub fn with_session_ttl_secs(mut self, ttl: u64) -> Self {
        self.session_ttl_secs = ttl;
        self
    }

    /// Issues a fresh access token for the current session and notifies
    /// subscribers with [`AuthChangeKind::TokenRefreshed`].
    ///
    /// Returns `None` if nobody is signed in.
    pub async fn refresh_session(&self) -> Option<Session> {
        let refreshed = {
            let mut state = self.state.lock().await;
            let subject = state.current.as_ref()?.subject.clone();
            let session = self.issue_session(subject);
            state.current = Some(session.clone());
            session
        };
        self.events.publish(SessionEvent {
            kind: AuthChangeKind::TokenRefreshed,
            session: Some(refreshed.clone()),
        });
        Some(refreshed)
    }

    /// Number of registered accounts.
    pub async fn account_count(&self) -> usize {
        self.state.lock().await.accounts.len()
    }

    fn issue_session(&self, subject: Identity) -> Session {
        let now = unix_now();
        Session {
            subject,
            access_token: generate_token(),
            refresh_token: Some(generate_token()),
            issued_at: now,
            expires_at: Some(now + self.session_ttl_secs),
        }
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityClient for MemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let session = {
            let mut state = self.state.lock().await;
            let record = state
                .accounts
                .get(&email_key(email))
                .filter(|r| r.password == password)
                .ok_or_else(|| {
                    IdentityError::rejected(
                        ErrorCode::INVALID_CREDENTIALS,
                        "Invalid login credentials",
                    )
                })?;

            if self.confirmation_required && !record.identity.email_confirmed {
                return Err(IdentityError::rejected(
                    ErrorCode::EMAIL_NOT_CONFIRMED,
                    "Email not confirmed",
                ));
            }

            let session = self.issue_session(record.identity.clone());
            state.current = Some(session.clone());
            session
        };

        tracing::debug!(identity_id = %session.subject.id, "memory provider: signed in");
        self.events.publish(SessionEvent::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, IdentityError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(IdentityError::rejected(
                ErrorCode::INVALID_EMAIL,
                "Unable to validate email address: invalid format",
            ));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(IdentityError::rejected(
                ErrorCode::WEAK_PASSWORD,
                format!("Password should be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }

        let response = {
            let mut state = self.state.lock().await;
            let key = email_key(email);
            if state.accounts.contains_key(&key) {
                return Err(IdentityError::rejected(
                    ErrorCode::USER_ALREADY_EXISTS,
                    "User already registered",
                ));
            }

            state.next_id += 1;
            let identity = Identity {
                id: IdentityId(format!("user-{}", state.next_id)),
                email: email.to_string(),
                email_confirmed: !self.confirmation_required,
            };
            state.accounts.insert(
                key,
                AccountRecord {
                    identity: identity.clone(),
                    password: password.to_string(),
                },
            );

            let session = self.issue_session(identity.clone());
            state.current = Some(session.clone());
            SignUpResponse { identity, session }
        };

        tracing::debug!(identity_id = %response.identity.id, "memory provider: account created");
        self.events
            .publish(SessionEvent::signed_in(response.session.clone()));
        Ok(response)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.state.lock().await.current = None;
        self.events.publish(SessionEvent::signed_out());
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        Ok(self.state.lock().await.current.clone())
    }

    fn on_session_change(&self) -> SessionSubscription {
        self.events.subscribe()
    }
}

impl AccountAdmin for MemoryIdentityProvider {
    async fn list_accounts(&self) -> Result<Vec<Account>, IdentityError> {
        let state = self.state.lock().await;
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .map(|r| Account {
                id: r.identity.id.clone(),
                email: r.identity.email.clone(),
                email_confirmed: r.identity.email_confirmed,
            })
            .collect();
        accounts.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(accounts)
    }

    async fn force_confirm(&self, id: &IdentityId) -> Result<(), IdentityError> {
        let mut state = self.state.lock().await;
        let record = state
            .accounts
            .values_mut()
            .find(|r| r.identity.id == *id)
            .ok_or_else(|| {
                IdentityError::rejected(ErrorCode::USER_NOT_FOUND, format!("User {id} not found"))
            })?;
        record.identity.email_confirmed = true;
        tracing::info!(identity_id = %id, "memory provider: account force-confirmed");
        Ok(())
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
