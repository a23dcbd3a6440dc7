//! Error types for identity provider calls.

use std::borrow::Cow;
use std::fmt;

use rapport_model::Interrupted;
use serde::{Deserialize, Serialize};

/// A machine-readable error code reported by the identity provider.
///
/// Providers identify failure classes with short snake_case codes. The
/// reconciler only branches on one of them ([`ErrorCode::EMAIL_NOT_CONFIRMED`]),
/// but the common ones are named here so implementations agree on spelling.
///
/// `Cow<'static, str>` lets the well-known codes be `const` (borrowed) while
/// provider-specific codes can still be built at runtime (owned).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(Cow<'static, str>);

impl ErrorCode {
    pub const EMAIL_NOT_CONFIRMED: Self = Self(Cow::Borrowed("email_not_confirmed"));
    pub const INVALID_CREDENTIALS: Self = Self(Cow::Borrowed("invalid_credentials"));
    pub const USER_ALREADY_EXISTS: Self = Self(Cow::Borrowed("user_already_exists"));
    pub const WEAK_PASSWORD: Self = Self(Cow::Borrowed("weak_password"));
    pub const INVALID_EMAIL: Self = Self(Cow::Borrowed("invalid_email"));
    pub const USER_NOT_FOUND: Self = Self(Cow::Borrowed("user_not_found"));

    /// Creates a code from a runtime string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors returned by [`IdentityClient`](crate::IdentityClient) and
/// [`AccountAdmin`](crate::AccountAdmin) calls.
///
/// `Clone + PartialEq` because the login path keeps the *original* sign-in
/// error around while it attempts recovery, and may hand that exact value
/// back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The provider refused the request: wrong password, duplicate email,
    /// unconfirmed account, and so on. `message` is human-readable and safe
    /// to show to the user.
    #[error("{message}")]
    Rejected { code: ErrorCode, message: String },

    /// The provider couldn't be reached or failed internally.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// The call hit its deadline or was cancelled.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl IdentityError {
    /// Shorthand for [`IdentityError::Rejected`].
    pub fn rejected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    /// The provider's error code, if it sent one.
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns `true` for the "email not confirmed" failure class, and only
    /// for that class.
    ///
    /// Matches on the code first and falls back to the message, since some
    /// providers only report this condition in prose.
    pub fn is_email_not_confirmed(&self) -> bool {
        match self {
            Self::Rejected { code, message } => {
                *code == ErrorCode::EMAIL_NOT_CONFIRMED
                    || message.to_ascii_lowercase().contains("email not confirmed")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_is_email_not_confirmed_matches_code() {
        let err = IdentityError::rejected(ErrorCode::EMAIL_NOT_CONFIRMED, "nope");
        assert!(err.is_email_not_confirmed());
    }

    #[test]
    fn test_is_email_not_confirmed_matches_message() {
        let err = IdentityError::rejected(ErrorCode::new("400"), "Email not confirmed");
        assert!(err.is_email_not_confirmed());
    }

    #[test]
    fn test_is_email_not_confirmed_rejects_other_failures() {
        let wrong_password = IdentityError::rejected(
            ErrorCode::INVALID_CREDENTIALS,
            "Invalid login credentials",
        );
        assert!(!wrong_password.is_email_not_confirmed());
        assert!(!IdentityError::Unavailable("down".into()).is_email_not_confirmed());
    }

    #[test]
    fn test_rejected_display_is_the_message() {
        let err = IdentityError::rejected(ErrorCode::WEAK_PASSWORD, "Password too short");
        assert_eq!(err.to_string(), "Password too short");
        assert_eq!(err.code(), Some(&ErrorCode::WEAK_PASSWORD));
    }

    #[test]
    fn test_from_interrupted() {
        let err: IdentityError = Interrupted::TimedOut {
            op: "identity.sign_in",
            after: Duration::from_secs(1),
        }
        .into();
        assert!(matches!(err, IdentityError::Interrupted(_)));
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_error_code_runtime_equals_const() {
        assert_eq!(ErrorCode::new("weak_password"), ErrorCode::WEAK_PASSWORD);
        assert_eq!(ErrorCode::WEAK_PASSWORD.to_string(), "weak_password");
    }
}
