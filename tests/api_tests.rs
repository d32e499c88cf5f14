//! Remote backend tests against a mock REST server

use std::sync::Arc;

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

use claimdesk::api::ApiClient;
use claimdesk::entities::CountryDraft;
use claimdesk::notify::MemoryNotifier;
use claimdesk::store::{Backend, RemoteBackend, Store, StoreError};

const STAMP: &str = "2024-03-01T09:30:00";

fn country(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "flagUrl": null, "createdAt": STAMP, "updatedAt": STAMP })
}

fn project(id: &str, name: &str, country_id: &str) -> Value {
    json!({ "id": id, "name": name, "countryId": country_id, "createdAt": STAMP, "updatedAt": STAMP })
}

fn contractor(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "createdAt": STAMP, "updatedAt": STAMP })
}

fn claim(id: &str, name: &str, project_id: &str, contractor_id: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "projectId": project_id,
        "contractorId": contractor_id,
        "createdAt": STAMP,
        "updatedAt": STAMP,
    })
}

/// Mock a list endpoint, ignoring the paging query
async fn mock_list(server: &mut ServerGuard, path: &str, body: Value) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

fn remote(server: &ServerGuard, page_size: u32) -> RemoteBackend {
    let api = ApiClient::new(&server.url(), None).unwrap();
    RemoteBackend::new(api, page_size)
}

#[tokio::test]
async fn test_list_pages_until_short_page() {
    let mut server = Server::new_async().await;

    let first = server
        .mock("GET", "/api/v1/countries/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("offset".into(), "0".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(json!([country("c1", "Kenya"), country("c2", "Ghana")]).to_string())
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/api/v1/countries/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("offset".into(), "2".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(json!([country("c3", "Peru")]).to_string())
        .expect(1)
        .create_async()
        .await;

    let countries = remote(&server, 2).list_countries().await.unwrap();

    let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Kenya", "Ghana", "Peru"]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_server_validation_error_is_notified() {
    let mut server = Server::new_async().await;
    let _create = server
        .mock("POST", "/api/v1/countries/")
        .match_query(Matcher::Any)
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "detail": [{ "loc": ["query", "name"], "msg": "Field required", "type": "missing" }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let notifier = Arc::new(MemoryNotifier::new());
    let mut store = Store::new(remote(&server, 100), notifier.clone());

    let err = store
        .add_country(CountryDraft::new("Kenya"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Api(_)));
    assert!(store.countries().is_empty());
    let errors = notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].title, "Failed to create country");
    assert_eq!(errors[0].description, "query.name: Field required");
}

#[tokio::test]
async fn test_refresh_failure_degrades_to_empty() {
    let mut server = Server::new_async().await;
    let _countries = mock_list(&mut server, "/api/v1/countries/", json!([country("c1", "Kenya")])).await;
    let _projects = server
        .mock("GET", "/api/v1/projects/")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let _contractors = mock_list(&mut server, "/api/v1/contractors/", json!([])).await;
    let _claims = mock_list(&mut server, "/api/v1/claims/", json!([])).await;

    let mut store = Store::new(remote(&server, 100), MemoryNotifier::new());
    let report = store.refresh().await;

    assert!(!report.is_complete());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].collection, "projects");
    assert_eq!(store.countries().len(), 1);
    assert!(store.projects().is_empty());
}

/// Load one project with one contractor and one claim from the mock server
async fn loaded_store(server: &mut ServerGuard, notifier: Arc<MemoryNotifier>) -> (Store, Vec<Mock>) {
    let mut mocks = vec![
        mock_list(server, "/api/v1/countries/", json!([country("c1", "Kenya")])).await,
        mock_list(server, "/api/v1/projects/", json!([project("p1", "Highway A", "c1")])).await,
        mock_list(server, "/api/v1/contractors/", json!([contractor("k1", "RoadWorks")])).await,
        mock_list(server, "/api/v1/claims/", json!([claim("x1", "Delay-1", "p1", "k1")])).await,
    ];
    let mut detail = contractor("k1", "RoadWorks");
    detail["projects"] = json!([project("p1", "Highway A", "c1")]);
    detail["claims"] = json!([]);
    detail["contextFiles"] = json!([]);
    mocks.push(
        server
            .mock("GET", "/api/v1/contractors/k1")
            .with_status(200)
            .with_body(detail.to_string())
            .create_async()
            .await,
    );

    let mut store = Store::new(remote(server, 100), notifier);
    assert!(store.refresh().await.is_complete());
    assert_eq!(
        store.contractors_for_project("p1").len(),
        1,
        "contractor detail should supply the project edge"
    );
    (store, mocks)
}

#[tokio::test]
async fn test_project_delete_leaves_cascade_to_server() {
    let mut server = Server::new_async().await;
    let notifier = Arc::new(MemoryNotifier::new());
    let (mut store, initial) = loaded_store(&mut server, notifier.clone()).await;

    // The server has cascaded: dependents are gone on the next read
    for mock in &initial[2..] {
        mock.remove_async().await;
    }
    let _contractors = mock_list(&mut server, "/api/v1/contractors/", json!([])).await;
    let _claims = mock_list(&mut server, "/api/v1/claims/", json!([])).await;

    let delete = server
        .mock("DELETE", "/api/v1/projects/p1")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let no_dependent_deletes = server
        .mock("DELETE", Matcher::Regex(r"^/api/v1/(contractors|claims)/".to_string()))
        .with_status(204)
        .expect(0)
        .create_async()
        .await;

    let outcome = store.delete_project("p1").await.unwrap().unwrap();

    delete.assert_async().await;
    no_dependent_deletes.assert_async().await;
    assert!(outcome.dependents_refreshed);
    assert_eq!(outcome.contractors_deleted.len(), 1);
    assert_eq!(outcome.claims_deleted.len(), 1);
    assert!(store.projects().is_empty());
    assert!(store.contractors().is_empty());
    assert!(store.claims().is_empty());
    assert_eq!(
        notifier.last().unwrap().description,
        "Highway A and all associated content has been deleted."
    );
}

#[tokio::test]
async fn test_failed_refetch_is_reported() {
    let mut server = Server::new_async().await;
    let (mut store, initial) = loaded_store(&mut server, Arc::new(MemoryNotifier::new())).await;

    initial[3].remove_async().await;
    let _claims = server
        .mock("GET", "/api/v1/claims/")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let _delete = server
        .mock("DELETE", "/api/v1/projects/p1")
        .with_status(204)
        .create_async()
        .await;

    let outcome = store.delete_project("p1").await.unwrap().unwrap();

    assert!(!outcome.dependents_refreshed);
    assert!(outcome.claims_deleted.is_empty());
    assert!(store.projects().is_empty());
    assert_eq!(store.claims().len(), 1);
}

#[tokio::test]
async fn test_failed_delete_keeps_record() {
    let mut server = Server::new_async().await;
    let notifier = Arc::new(MemoryNotifier::new());
    let (mut store, _initial) = loaded_store(&mut server, notifier.clone()).await;

    let _delete = server
        .mock("DELETE", "/api/v1/claims/x1")
        .with_status(404)
        .with_body(json!({ "detail": "Claim not found" }).to_string())
        .create_async()
        .await;

    let err = store.delete_claim("x1").await.unwrap_err();

    assert_eq!(err.user_message(), "Claim not found");
    assert_eq!(store.claims().len(), 1);
    let errors = notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].title, "Failed to delete claim");
}
