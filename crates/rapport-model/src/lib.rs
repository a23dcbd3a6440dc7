//! Data model for Rapport.
//!
//! This crate defines the values that the reconciler moves around:
//!
//! - **Identity types** ([`Session`], [`Identity`], [`IdentityId`],
//!   [`Account`]) — what the identity provider hands out.
//! - **Profile types** ([`Profile`], [`ProfileDraft`], [`ProfileRow`],
//!   [`AgencyFlag`]) — application-owned attributes about a user, in the
//!   three shapes they take (published, submitted at sign-up, stored remotely).
//! - **Published state** ([`ReconciledState`]) — the tuple the presentation
//!   layer reads.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how cached values are
//!   turned into strings and back.
//! - **Interruption** ([`Interrupted`]) — the deadline/cancellation outcome
//!   shared by every collaborator error type.
//!
//! # Architecture
//!
//! The model sits underneath every other crate. It knows nothing about
//! networks, caches or tasks:
//!
//! ```text
//! Identity / Store / Cache (collaborators) → Model ← Session (reconciler)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod interrupt;
mod profile;
mod state;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::CodecError;
pub use interrupt::Interrupted;
pub use profile::{AgencyFlag, Profile, ProfileDraft, ProfileRow};
pub use state::ReconciledState;
pub use types::{Account, Identity, IdentityId, Session};
