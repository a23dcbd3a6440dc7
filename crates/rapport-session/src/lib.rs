//! Session and profile reconciliation for Rapport.
//!
//! The [`Reconciler`] owns the single published [`ReconciledState`] and is
//! the only thing that changes it. It merges three sources into that state:
//!
//! 1. the identity provider's session (one-shot read plus change
//!    notifications),
//! 2. the remote profile row,
//! 3. the local profile cache, used when the remote row can't be had.
//!
//! ```text
//!   IdentityClient ──┐
//!   (events, calls)  │
//!                    ▼
//!   ProfileStore ──► Reconciler ──► StateContainer ──► watch::Receiver (UI)
//!                    ▲
//!   ProfileCache ────┘
//! ```
//!
//! Every collaborator call runs under a deadline and a shared cancellation
//! token (see [`ReconcilerConfig::call_timeout`] and
//! [`Reconciler::shutdown`]), and every operation clears `is_loading` on
//! every exit path.
//!
//! [`ReconciledState`]: rapport_model::ReconciledState

mod config;
mod error;
mod guard;
mod listener;
mod outcome;
mod reconciler;
mod recovery;
mod state;

pub use config::ReconcilerConfig;
pub use error::SessionError;
pub use listener::ListenerHandle;
pub use outcome::{Outcome, Warning};
pub use reconciler::{Reconciler, ReconcilerBuilder};
pub use state::StateContainer;
