use std::env;
use std::sync::Arc;

use petclinic_api::app_state;
use petclinic_api::data::db::Database;
use petclinic_api::data::db_storage::PgStore;
use petclinic_api::handlers::AppState;
use petclinic_api::memory_storage::MemoryStore;
use petclinic_api::models::{OwnerDto, SpecialtyDto, VetDto};

async fn pg_state() -> anyhow::Result<AppState> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url, 2).await?;
    Ok(app_state(Arc::new(PgStore::new(db.pool))))
}

/// Integration smoke test for the Postgres store.
/// Marked ignored so it never runs against a real database by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn owner_round_trip_smoke_test() -> anyhow::Result<()> {
    let state = pg_state().await?;

    let created = state
        .owners
        .create(OwnerDto {
            id: None,
            first_name: "Smoke".into(),
            last_name: "Test".into(),
            address: "1 Test Way".into(),
            city: "Testville".into(),
            telephone: "000".into(),
        })
        .await?;
    let id = created.id.expect("id assigned");

    let mut found = state.owners.find_by_id(id).await?;
    assert_eq!(found, created);

    found.city = "Elsewhere".into();
    state.owners.update(found).await?;
    assert_eq!(state.owners.find_by_id(id).await?.city, "Elsewhere");

    state.owners.delete(id).await?;
    assert!(state.owners.find_by_id(id).await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn vet_specialty_link_smoke_test() -> anyhow::Result<()> {
    let state = pg_state().await?;

    let vet = state
        .vets
        .create(VetDto {
            first_name: "Smoke".into(),
            last_name: "Vet".into(),
            ..Default::default()
        })
        .await?;
    let specialty = state
        .specialties
        .create(SpecialtyDto {
            id: None,
            name: "smoke-specialty".into(),
        })
        .await?;
    let (vet_id, specialty_id) = (vet.id.expect("vet id"), specialty.id.expect("specialty id"));

    let linked = state.vets.assign_specialty(vet_id, specialty_id).await?;
    assert_eq!(linked.specialties, vec![specialty]);

    state.specialties.delete(specialty_id).await?;
    assert!(state.vets.find_by_id(vet_id).await?.specialties.is_empty());

    state.vets.delete(vet_id).await?;
    Ok(())
}

fn owner(first_name: &str) -> OwnerDto {
    OwnerDto {
        id: None,
        first_name: first_name.into(),
        last_name: "Sequence".into(),
        address: "2 Test Way".into(),
        city: "Testville".into(),
        telephone: "000".into(),
    }
}

/// Runs the id lifecycle every store must agree on: an explicit-id upsert
/// pushes later inserts past it, and a deleted id is never assigned again,
/// even after updates to other rows.
async fn check_owner_id_contract(state: &AppState) -> anyhow::Result<()> {
    let highest = state
        .owners
        .find_all()
        .await?
        .iter()
        .filter_map(|o| o.id)
        .max()
        .unwrap_or(0);

    let explicit_id = highest + 1000;
    let mut explicit = owner("Explicit");
    explicit.id = Some(explicit_id);
    assert_eq!(state.owners.update(explicit).await?.id, Some(explicit_id));

    let next = state.owners.create(owner("Next")).await?;
    let deleted_id = next.id.expect("id assigned");
    assert!(deleted_id > explicit_id, "insert after upsert reused a low id");

    state.owners.delete(deleted_id).await?;

    // Rewriting an older row must not rewind id assignment
    let george = state.owners.find_by_id(1).await?;
    state.owners.update(george).await?;

    let recreated = state.owners.create(owner("Recreated")).await?;
    let recreated_id = recreated.id.expect("id assigned");
    assert_ne!(recreated_id, deleted_id, "deleted id was reissued");
    assert!(recreated_id > deleted_id);
    assert!(state.owners.find_by_id(deleted_id).await.unwrap_err().is_not_found());

    state.owners.delete(recreated_id).await?;
    state.owners.delete(explicit_id).await?;
    Ok(())
}

#[tokio::test]
async fn memory_store_owner_id_contract() -> anyhow::Result<()> {
    let state = app_state(Arc::new(MemoryStore::with_demo_data()));
    check_owner_id_contract(&state).await
}

#[tokio::test]
#[ignore]
async fn both_stores_follow_owner_id_contract() -> anyhow::Result<()> {
    let memory = app_state(Arc::new(MemoryStore::with_demo_data()));
    check_owner_id_contract(&memory).await?;

    let postgres = pg_state().await?;
    check_owner_id_contract(&postgres).await
}

#[tokio::test]
#[ignore]
async fn deleted_owner_id_is_not_reissued_after_update() -> anyhow::Result<()> {
    let state = pg_state().await?;

    let first = state.owners.create(owner("First")).await?;
    let deleted_id = first.id.expect("id assigned");
    state.owners.delete(deleted_id).await?;

    let george = state.owners.find_by_id(1).await?;
    state.owners.update(george).await?;

    let second = state.owners.create(owner("Second")).await?;
    let second_id = second.id.expect("id assigned");
    assert_ne!(second_id, deleted_id, "deleted id was reissued");
    assert!(state.owners.find_by_id(deleted_id).await.unwrap_err().is_not_found());

    state.owners.delete(second_id).await?;
    Ok(())
}
