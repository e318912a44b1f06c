/// End-to-end HTTP tests against the real router on a loopback listener
/// The store is the in-memory one seeded with the clinic's demo data
use std::net::SocketAddr;
use std::sync::Arc;

use petclinic_api::memory_storage::MemoryStore;
use petclinic_api::{app_state, routes};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct TestApp {
    base_url: String,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    let state = app_state(Arc::new(MemoryStore::with_demo_data()));
    let app = routes::build_router(Arc::new(state), 64 * 1024);

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
    })
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn test_find_all_owners() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app.client.get(app.url("/owners")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["content-type"]
        .to_str()?
        .starts_with("application/json"));

    let owners: Value = res.json().await?;
    assert_eq!(owners[0]["id"], 1);
    Ok(())
}

#[tokio::test]
async fn test_find_owner_ok() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app.client.get(app.url("/owners/1")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let owner: Value = res.json().await?;
    assert_eq!(owner["id"], 1);
    assert_eq!(owner["firstName"], "George");
    assert_eq!(owner["lastName"], "Franklin");
    assert_eq!(owner["city"], "Madison");
    Ok(())
}

#[tokio::test]
async fn test_missing_ids_are_404_with_empty_body() -> anyhow::Result<()> {
    let app = start_server().await?;

    for path in ["/owners/999", "/vets/999", "/specialties/999"] {
        let res = app.client.get(app.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "GET {}", path);
        assert!(res.text().await?.is_empty());

        let res = app
            .client
            .put(app.url(path))
            .json(&json!({"firstName": "X", "name": "X"}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "PUT {}", path);

        let res = app.client.delete(app.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "DELETE {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn test_owner_lifecycle() -> anyhow::Result<()> {
    let app = start_server().await?;

    let new_owner = json!({
        "firstName": "Luis",
        "lastName": "Martinez",
        "address": "789 Pine St.",
        "city": "Cusco",
        "telephone": "923456789"
    });

    // CREATE
    let res = app
        .client
        .post(app.url("/owners"))
        .json(&new_owner)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["id"].as_i64().expect("id assigned");
    for field in ["firstName", "lastName", "address", "city", "telephone"] {
        assert_eq!(created[field], new_owner[field], "{}", field);
    }

    // FIND
    let found: Value = app
        .client
        .get(app.url(&format!("/owners/{}", id)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(found, created);

    // UPDATE
    let update = json!({
        "id": id,
        "firstName": "Luis Alberto",
        "lastName": "Martinez Lopez",
        "address": "789 Pine Street",
        "city": "Cusco City",
        "telephone": "923456790"
    });
    let res = app
        .client
        .put(app.url(&format!("/owners/{}", id)))
        .json(&update)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Re-applying the same payload changes nothing
    let again: Value = app
        .client
        .put(app.url(&format!("/owners/{}", id)))
        .json(&update)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(again, update);

    let found: Value = app
        .client
        .get(app.url(&format!("/owners/{}", id)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(found, update);

    // DELETE
    let res = app
        .client
        .delete(app.url(&format!("/owners/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, format!("Delete ID :{}", id));

    let res = app
        .client
        .get(app.url(&format!("/owners/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_put_ignores_body_id() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = app
        .client
        .put(app.url("/owners/2"))
        .json(&json!({
            "id": 1,
            "firstName": "Betty",
            "lastName": "Davis",
            "address": "640 Cardinal Ave.",
            "city": "Sun Prairie",
            "telephone": "6085551749"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["id"], 2);

    let george: Value = app
        .client
        .get(app.url("/owners/1"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(george["firstName"], "George");
    Ok(())
}

#[tokio::test]
async fn test_owner_filters() -> anyhow::Result<()> {
    let app = start_server().await?;

    let owners: Vec<Value> = app
        .client
        .get(app.url("/owners?lastName=Davis"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(owners.len(), 2);
    assert!(owners.iter().all(|o| o["lastName"] == "Davis"));

    let owners: Vec<Value> = app
        .client
        .get(app.url("/owners?city=Nowhere"))
        .send()
        .await?
        .json()
        .await?;
    assert!(owners.is_empty());

    let res = app
        .client
        .get(app.url("/owners?lastName=Davis&city=Windsor"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_vet_lifecycle_with_specialties() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = app
        .client
        .post(app.url("/vets"))
        .json(&json!({
            "firstName": "Ana",
            "lastName": "Torres",
            "specialties": [{"id": 1, "name": "radiology"}]
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let vet: Value = res.json().await?;
    let id = vet["id"].as_i64().expect("id assigned");
    assert_eq!(vet["specialties"], json!([]));

    let vet: Value = app
        .client
        .put(app.url(&format!("/vets/{}/specialties/2", id)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(vet["specialties"], json!([{"id": 2, "name": "surgery"}]));

    // Renaming keeps the specialty link
    let vet: Value = app
        .client
        .put(app.url(&format!("/vets/{}", id)))
        .json(&json!({"firstName": "Ana Maria", "lastName": "Torres"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(vet["firstName"], "Ana Maria");
    assert_eq!(vet["specialties"][0]["name"], "surgery");

    let res = app
        .client
        .put(app.url(&format!("/vets/{}/specialties/999", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let vet: Value = app
        .client
        .delete(app.url(&format!("/vets/{}/specialties/2", id)))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(vet["specialties"], json!([]));

    let res = app
        .client
        .delete(app.url(&format!("/vets/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .client
        .get(app.url(&format!("/vets/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_specialty_scenario() -> anyhow::Result<()> {
    let app = start_server().await?;

    let res = app
        .client
        .post(app.url("/specialties"))
        .json(&json!({"name": "cardiology"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["id"].as_i64().expect("id assigned");
    assert_eq!(created["name"], "cardiology");

    let updated: Value = app
        .client
        .put(app.url(&format!("/specialties/{}", id)))
        .json(&json!({"name": "neurology-advanced"}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(updated["name"], "neurology-advanced");

    let found: Vec<Value> = app
        .client
        .get(app.url("/specialties?name=neurology-advanced"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], id);

    let res = app
        .client
        .delete(app.url(&format!("/specialties/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .client
        .get(app.url(&format!("/specialties/{}", id)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_openapi_document_is_served() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = app.client.get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let doc: Value = res.json().await?;
    assert!(doc["paths"]["/owners/{id}"].is_object());
    Ok(())
}
