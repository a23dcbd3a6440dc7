//! Profile types: application-owned attributes about a user.
//!
//! A profile shows up in three shapes:
//!
//! - [`ProfileDraft`] — what the user typed into the sign-up form.
//! - [`ProfileRow`] — the remote row, keyed by identity id. It has no email
//!   column; email lives on the identity.
//! - [`Profile`] — the published (and cached) shape, with the email
//!   denormalized from the identity.

use serde::{Deserialize, Serialize};

use crate::IdentityId;

// ---------------------------------------------------------------------------
// AgencyFlag
// ---------------------------------------------------------------------------

/// Whether the user signed up on behalf of an agency.
///
/// On the wire and in the cache this is the string `"Yes"` or `"No"`,
/// matching the sign-up form's radio values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
pub enum AgencyFlag {
    Yes,
    #[default]
    No,
}

impl AgencyFlag {
    /// Parses the remote row's free-form value.
    ///
    /// `yes`, `true` and `1` (any case) mean [`AgencyFlag::Yes`]; anything
    /// else, including a missing value, means [`AgencyFlag::No`].
    pub fn parse_loose(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v)
                if v.eq_ignore_ascii_case("yes")
                    || v.eq_ignore_ascii_case("true")
                    || v == "1" =>
            {
                Self::Yes
            }
            _ => Self::No,
        }
    }

    /// The canonical string form: `"Yes"` or `"No"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl From<bool> for AgencyFlag {
    fn from(is_agency: bool) -> Self {
        if is_agency { Self::Yes } else { Self::No }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// The published profile.
///
/// Field names serialize in camelCase (`fullName`, `phoneNumber`, ...)
/// because that's the layout the cached blob has always used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    /// Copied from the identity, never from the row.
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub is_agency: AgencyFlag,
}

impl Profile {
    /// Maps a remote row into the published shape.
    ///
    /// `email` comes from the identity because the row may predate an email
    /// change. Missing text columns become empty strings; a blank company
    /// name becomes `None`.
    pub fn from_row(row: &ProfileRow, email: &str) -> Self {
        Self {
            full_name: row.full_name.clone().unwrap_or_default(),
            email: email.to_string(),
            phone_number: row.phone_number.clone().unwrap_or_default(),
            company_name: non_blank(row.company_name.as_deref()),
            is_agency: AgencyFlag::parse_loose(row.is_agency.as_deref()),
        }
    }

    /// Builds the optimistic profile published right after sign-up.
    pub fn from_draft(draft: &ProfileDraft, email: &str) -> Self {
        Self {
            full_name: draft.full_name.trim().to_string(),
            email: email.trim().to_string(),
            phone_number: draft.phone_number.trim().to_string(),
            company_name: non_blank(draft.company_name.as_deref()),
            is_agency: draft.is_agency,
        }
    }
}

// ---------------------------------------------------------------------------
// ProfileDraft
// ---------------------------------------------------------------------------

/// Profile fields submitted with a sign-up request.
///
/// Everything is required except `company_name`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDraft {
    pub full_name: String,
    pub phone_number: String,
    pub company_name: Option<String>,
    pub is_agency: AgencyFlag,
}

impl ProfileDraft {
    /// Checks that the required fields are present.
    ///
    /// # Errors
    /// Returns a human-readable message naming the first blank required
    /// field.
    pub fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("full name is required".into());
        }
        if self.phone_number.trim().is_empty() {
            return Err("phone number is required".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ProfileRow
// ---------------------------------------------------------------------------

/// The remote profile row.
///
/// Every content column is nullable on the backend, so every field except
/// the key is an `Option`. The timestamps are set by the backend and kept
/// as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: IdentityId,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub company_name: Option<String>,
    pub is_agency: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ProfileRow {
    /// Builds the row inserted at sign-up for a freshly created identity.
    pub fn from_draft(id: IdentityId, draft: &ProfileDraft) -> Self {
        Self {
            id,
            full_name: Some(draft.full_name.trim().to_string()),
            phone_number: Some(draft.phone_number.trim().to_string()),
            company_name: non_blank(draft.company_name.as_deref()),
            is_agency: Some(draft.is_agency.as_str().to_string()),
            created_at: None,
            updated_at: None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
