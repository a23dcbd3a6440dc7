//! Identity-side types: what the identity provider hands to the reconciler.
//!
//! None of these are created by the reconciler itself. They arrive from the
//! identity client (sign-in, sign-up, session restore, change notifications)
//! and are published as-is. A new `Session` always replaces the old one
//! wholesale; nothing here is mutated in place.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// IdentityId
// ---------------------------------------------------------------------------

/// A unique identifier for an account at the identity provider.
///
/// This is a "newtype wrapper" around the provider's string id (usually a
/// UUID). Wrapping it means a profile row id, an email and an identity id
/// can't be mixed up in function signatures even though all three are
/// strings underneath.
///
/// `#[serde(transparent)]` serializes it as the bare string, so
/// `IdentityId("u-1")` becomes `"u-1"` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(pub String);

impl IdentityId {
    /// Creates an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The account record the identity provider treats as authoritative.
///
/// The reconciler never publishes an `Identity` on its own: it always comes
/// as the subject of a [`Session`], and both are set or cleared together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable account id.
    pub id: IdentityId,

    /// The account's email address.
    pub email: String,

    /// Whether the provider considers the email verified.
    pub email_confirmed: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Provider-issued proof of an authenticated identity.
///
/// The token strings are opaque to Rapport — we never parse or verify them.
/// The reconciler only cares whether a session is present and who its
/// subject is.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Who this session authenticates.
    pub subject: Identity,

    /// Bearer token for calls to the backend.
    pub access_token: String,

    /// Token used by the provider to mint a new access token, if the
    /// session can be refreshed.
    pub refresh_token: Option<String>,

    /// When the session was issued (unix seconds).
    pub issued_at: u64,

    /// When the access token stops being valid (unix seconds), if known.
    pub expires_at: Option<u64>,
}

impl Session {
    /// Returns the identity this session authenticates.
    pub fn subject(&self) -> &Identity {
        &self.subject
    }

    /// Returns `true` if the provider can refresh this session.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Returns `true` if the session has an expiry and `now` is past it.
    ///
    /// Sessions without an expiry never report expired.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Tokens are secrets, so `Debug` prints the subject and the timing fields
/// only. This keeps tokens out of `tracing` output that formats sessions.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("subject", &self.subject)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("refreshable", &self.can_refresh())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// One entry of the administrative account listing.
///
/// Only the confirmation workaround sees these: it scans the listing for the
/// email that failed to sign in, then force-confirms that account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account id (same id space as [`Identity::id`]).
    pub id: IdentityId,
    /// The account's email address.
    pub email: String,
    /// Whether the email is verified.
    pub email_confirmed: bool,
}

impl Account {
    /// Returns `true` if this account belongs to `email` (case-insensitive).
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}
