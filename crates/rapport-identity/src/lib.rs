//! Identity provider contract for Rapport.
//!
//! Rapport doesn't implement authentication itself — credential checks,
//! session issuance and token refresh belong to your identity provider.
//! This crate defines what the reconciler needs from it:
//!
//! 1. **Regular client calls** — sign in, sign up, sign out, read the
//!    current session ([`IdentityClient`] trait).
//! 2. **Change notifications** — a subscription that reports every time the
//!    provider's session changes ([`SessionSubscription`]).
//! 3. **Elevated account management** — listing accounts and force-marking
//!    one confirmed ([`AccountAdmin`] trait). This is a separate trait on
//!    purpose: it needs administrative privilege, and a deployment opts in
//!    by handing one to the reconciler.
//!
//! # Feature Flags
//!
//! - `memory` (default) — [`MemoryIdentityProvider`], an in-process
//!   provider for development and tests.

#![allow(async_fn_in_trait)]

mod admin;
mod client;
mod error;
mod events;
#[cfg(feature = "memory")]
mod memory;

pub use admin::{AccountAdmin, NoAdmin};
pub use client::{IdentityClient, SignUpResponse};
pub use error::{ErrorCode, IdentityError};
pub use events::{
    AuthChangeKind, SessionBroadcaster, SessionChange, SessionEvent,
    SessionSubscription,
};
#[cfg(feature = "memory")]
pub use memory::MemoryIdentityProvider;
