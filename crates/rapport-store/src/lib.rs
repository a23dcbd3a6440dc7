//! Remote profile store contract for Rapport.
//!
//! The profile store holds one row per identity ([`ProfileRow`], keyed by
//! [`IdentityId`]). It is the authoritative copy of a user's profile; the
//! local cache only mirrors it.
//!
//! # Key types
//!
//! - [`ProfileStore`] — the trait your backend adapter implements
//! - [`ProfileStoreError`] — with the distinguished [`ProfileStoreError::NotFound`]
//! - [`MemoryProfileStore`] — in-process store (feature `memory`, default)
//!
//! [`ProfileRow`]: rapport_model::ProfileRow
//! [`IdentityId`]: rapport_model::IdentityId

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "memory")]
mod memory;
mod store;

pub use error::ProfileStoreError;
#[cfg(feature = "memory")]
pub use memory::MemoryProfileStore;
pub use store::ProfileStore;
