//! End-to-end runs against the in-memory provider, the in-memory profile
//! store and a file-backed cache.

use std::sync::Arc;

use rapport_cache::{DEFAULT_CACHE_KEY, FileStore, KeyValueStore};
use rapport_identity::{IdentityClient, MemoryIdentityProvider};
use rapport_model::{AgencyFlag, Profile, ProfileDraft};
use rapport_session::Reconciler;
use rapport_store::MemoryProfileStore;

fn draft() -> ProfileDraft {
    ProfileDraft {
        full_name: "Ada Lovelace".into(),
        phone_number: "555-0100".into(),
        company_name: None,
        is_agency: AgencyFlag::No,
    }
}

#[tokio::test]
async fn test_full_lifecycle_with_confirmation_required_provider() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let provider = MemoryIdentityProvider::new().with_confirmation_required(true);
    let store = MemoryProfileStore::new();
    let reconciler = Reconciler::builder(
        provider.clone(),
        store.clone(),
        Arc::new(FileStore::open(&cache_path)),
    )
    .account_admin(provider.clone())
    .build();

    // Sign-up publishes the submitted profile right away.
    let outcome = reconciler.sign_up("ada@x.com", "secret1", &draft()).await.unwrap();
    assert!(outcome.is_clean());
    assert_eq!(
        reconciler.state().profile(),
        Some(&Profile::from_draft(&draft(), "ada@x.com"))
    );
    assert_eq!(store.len().await, 1);

    let outcome = reconciler.logout().await;
    assert!(outcome.is_clean());
    assert!(!reconciler.state().is_authenticated());
    let file = FileStore::open(&cache_path);
    assert_eq!(file.get(DEFAULT_CACHE_KEY).await.unwrap(), None);

    // The account was never confirmed, so login needs the workaround.
    let outcome = reconciler.login("ada@x.com", "secret1").await.unwrap();
    assert!(outcome.recovered);
    let state = reconciler.state();
    assert!(state.is_authenticated());
    assert_eq!(state.profile().unwrap().full_name, "Ada Lovelace");

    // A second login no longer needs it.
    reconciler.logout().await;
    let outcome = reconciler.login("ada@x.com", "secret1").await.unwrap();
    assert!(!outcome.recovered);
}

#[tokio::test]
async fn test_reload_restores_profile_from_file_cache_when_row_missing() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let provider = MemoryIdentityProvider::new();
    let store = MemoryProfileStore::new();

    let first = Reconciler::builder(
        provider.clone(),
        store.clone(),
        Arc::new(FileStore::open(&cache_path)),
    )
    .build();
    first.sign_up("ada@x.com", "secret1", &draft()).await.unwrap();
    let published = first.state().profile().cloned();
    first.shutdown();

    // The remote row disappears; the provider still holds the session.
    let id = provider.current_session().await.unwrap().unwrap().subject.id;
    store.remove(&id).await;

    let reloaded = Reconciler::builder(
        provider.clone(),
        store.clone(),
        Arc::new(FileStore::open(&cache_path)),
    )
    .build();
    let _listener = reloaded.bootstrap().await;

    let state = reloaded.state();
    assert!(state.is_authenticated());
    assert!(published.is_some());
    assert_eq!(state.profile().cloned(), published);
}
