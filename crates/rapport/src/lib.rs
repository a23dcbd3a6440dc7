//! # Rapport
//!
//! Client-side session and profile reconciliation.
//!
//! Rapport sits between an application's UI and its identity/profile
//! backend and keeps one consistent answer to "who is signed in, and what
//! is their profile", across restarts, flaky networks and backend quirks
//! (unconfirmed emails, missing profile rows).
//!
//! You implement three small traits over your backend:
//!
//! - [`IdentityClient`](prelude::IdentityClient) for the identity provider
//!   (plus, optionally, [`AccountAdmin`](prelude::AccountAdmin) for the
//!   login confirmation workaround),
//! - [`ProfileStore`](prelude::ProfileStore) for the remote profile rows,
//! - [`KeyValueStore`](prelude::KeyValueStore) for local persistence,
//!
//! and hand them to a [`Reconciler`](prelude::Reconciler).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rapport::prelude::*;
//!
//! # async fn run() -> Result<(), RapportError> {
//! rapport::telemetry::init();
//!
//! let provider = MemoryIdentityProvider::new();
//! let reconciler = Reconciler::builder(
//!     provider.clone(),
//!     MemoryProfileStore::new(),
//!     MemoryStore::new(),
//! )
//! .account_admin(provider)
//! .build();
//!
//! let _listener = reconciler.bootstrap().await;
//! reconciler.login("ada@x.com", "secret1").await?;
//! println!("{:?}", reconciler.state().profile());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod telemetry;

pub use error::RapportError;

pub use rapport_cache as cache;
pub use rapport_identity as identity;
pub use rapport_model as model;
pub use rapport_session as session;
pub use rapport_store as store;

/// Everything needed to wire up and drive a reconciler.
pub mod prelude {
    pub use crate::RapportError;
    pub use rapport_cache::{CacheError, FileStore, KeyValueStore, MemoryStore, ProfileCache};
    pub use rapport_identity::{
        AccountAdmin, ErrorCode, IdentityClient, IdentityError, MemoryIdentityProvider, NoAdmin,
        SessionEvent, SessionSubscription, SignUpResponse,
    };
    pub use rapport_model::{
        Account, AgencyFlag, Identity, IdentityId, Profile, ProfileDraft, ProfileRow,
        ReconciledState, Session,
    };
    pub use rapport_session::{
        ListenerHandle, Outcome, Reconciler, ReconcilerBuilder, ReconcilerConfig, SessionError,
        Warning,
    };
    pub use rapport_store::{MemoryProfileStore, ProfileStore, ProfileStoreError};
}
