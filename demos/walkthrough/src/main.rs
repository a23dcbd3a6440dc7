use std::sync::Arc;

use rapport::prelude::*;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn show(step: &str, state: &ReconciledState) {
    let who = state
        .identity()
        .map(|i| format!("{} ({})", i.email, i.id))
        .unwrap_or_else(|| "nobody".into());
    let profile = state
        .profile()
        .map(|p| format!("{} / {} / agency: {}", p.full_name, p.phone_number, p.is_agency.as_str()))
        .unwrap_or_else(|| "-".into());

    println!("== {step}");
    println!("   signed in: {who}");
    println!("   profile:   {profile}");
    println!("   loading:   {}", state.is_loading());
}

fn show_outcome(outcome: &Outcome) {
    if outcome.recovered {
        println!("   (signed in through the confirmation workaround)");
    }
    for warning in &outcome.warnings {
        println!("   warning: {warning}");
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), RapportError> {
    rapport::telemetry::init_with_default("warn");

    let dir = tempfile::tempdir().map_err(|e| RapportError::Cache(CacheError::Io(e)))?;
    let cache_path = dir.path().join("cache.json");

    // A provider that rejects unconfirmed accounts, so login has to recover.
    let provider = MemoryIdentityProvider::new().with_confirmation_required(true);
    let store = MemoryProfileStore::new();

    let reconciler = Reconciler::builder(
        provider.clone(),
        store.clone(),
        Arc::new(FileStore::open(&cache_path)),
    )
    .account_admin(provider.clone())
    .build();

    let listener = reconciler.bootstrap().await;
    show("bootstrap", &reconciler.state());

    let draft = ProfileDraft {
        full_name: "Ada Lovelace".into(),
        phone_number: "555-0100".into(),
        company_name: Some("Analytical Engines".into()),
        is_agency: AgencyFlag::Yes,
    };
    let outcome = reconciler.sign_up("ada@example.com", "difference", &draft).await?;
    show("sign-up", &reconciler.state());
    show_outcome(&outcome);

    let outcome = reconciler.logout().await;
    show("logout", &reconciler.state());
    show_outcome(&outcome);

    match reconciler.login("ada@example.com", "wrong-password").await {
        Ok(_) => println!("== login with a wrong password unexpectedly succeeded"),
        Err(e) => println!("== login with a wrong password: {e}"),
    }

    let outcome = reconciler.login("ada@example.com", "difference").await?;
    show("login", &reconciler.state());
    show_outcome(&outcome);

    // Someone else edits the remote row; refresh picks it up.
    if let Some(id) = reconciler.state().identity().map(|i| i.id.clone()) {
        let mut row = ProfileRow::from_draft(id, &draft);
        row.phone_number = Some("555-0199".into());
        store.upsert(row).await;
    }
    reconciler.refresh_profile().await;
    show("refresh", &reconciler.state());

    let outcome = reconciler.logout().await;
    show("logout", &reconciler.state());
    show_outcome(&outcome);

    listener.stop().await;
    reconciler.shutdown();
    Ok(())
}
