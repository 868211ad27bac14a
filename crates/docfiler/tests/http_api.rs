use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use docfiler::clock::FixedClock;
use docfiler::http::{router, AppState};
use docfiler::storage::MemoryBackend;
use docfiler::DocumentService;

fn app_with(backend: MemoryBackend) -> Router {
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap()));
    let service = DocumentService::with_clock(Box::new(backend), clock);
    router(AppState::new(service))
}

fn app() -> Router {
    app_with(MemoryBackend::new())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn gate_pass() -> Value {
    json!({
        "type": "gate-pass",
        "date": "2024-01-15",
        "personName": "John Doe",
        "authorizedBy": "Manager Smith",
        "status": "approved",
        "assetType": "Laptop",
        "assetTag": "LT001234",
        "exitDate": "2024-01-15",
        "returnDate": "2024-01-20",
        "purpose": "Work from home setup"
    })
}

#[tokio::test]
async fn test_health() {
    let (status, _) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_then_read() {
    let app = app();
    let (status, created) = send(&app, Method::POST, "/api/documents", Some(gate_pass())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["docId"], "GATEPASS2401001");
    assert_eq!(created["type"], "gate-pass");
    assert_eq!(created["assetTag"], "LT001234");
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, Method::GET, &format!("/api/documents/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (_, all) = send(&app, Method::GET, "/api/documents", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_missing_field_is_bad_request() {
    let app = app();
    let mut payload = gate_pass();
    payload.as_object_mut().unwrap().remove("personName");

    let (status, body) = send(&app, Method::POST, "/api/documents", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("personName"));

    let (_, all) = send(&app, Method::GET, "/api/documents", None).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let app = app();
    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method, "/api/documents/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Document not found");
    }
    let (status, _) = send(&app, Method::PUT, "/api/documents/nope", Some(gate_pass())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_keeps_identity() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/api/documents", Some(gate_pass())).await;
    let id = created["id"].as_str().unwrap();

    let mut changed = gate_pass();
    changed["status"] = json!("rejected");
    changed["purpose"] = json!("Conference");
    let (status, updated) =
        send(&app, Method::PUT, &format!("/api/documents/{id}"), Some(changed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["docId"], created["docId"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(updated["status"], "rejected");
    assert_eq!(updated["purpose"], "Conference");
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/api/documents", Some(gate_pass())).await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/documents/{id}"),
        Some(json!({"status": "rejected"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "rejected");
    assert_eq!(updated["type"], "gate-pass");
    assert_eq!(updated["personName"], "John Doe");
    assert_eq!(updated["assetTag"], "LT001234");
    assert_eq!(updated["purpose"], "Work from home setup");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/documents/{id}"),
        Some(json!({"personName": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("personName"));
}

#[tokio::test]
async fn test_delete_then_gone() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/api/documents", Some(gate_pass())).await;
    let uri = format!("/api/documents/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_query_filters() {
    let app = app();
    send(&app, Method::POST, "/api/documents", Some(gate_pass())).await;

    let (status, results) = send(
        &app,
        Method::GET,
        "/api/documents/search?name=john&type=gate-pass&status=",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["filtered"], true);
    assert_eq!(results["count"], 1);

    let (_, results) = send(&app, Method::GET, "/api/documents/search?type=invoice", None).await;
    assert_eq!(results["count"], 0);
    assert!(results["documents"].as_array().unwrap().is_empty());

    let (_, results) = send(&app, Method::GET, "/api/documents/search", None).await;
    assert_eq!(results["filtered"], false);
    assert_eq!(results["count"], 1);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let app = app();
    send(&app, Method::POST, "/api/documents", Some(gate_pass())).await;

    let (status, stats) = send(&app, Method::GET, "/api/dashboard/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalDocuments"], 1);
    assert_eq!(stats["pendingDocuments"], 0);
    assert_eq!(stats["monthlyDocuments"], 1);
    assert_eq!(stats["recentDocuments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_document_types() {
    let app = app();
    let (status, types) = send(&app, Method::GET, "/api/document-types", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(types.as_array().unwrap().len(), 5);

    let (status, job_card) = send(&app, Method::GET, "/api/document-types/job-card", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job_card["name"], "Job Card");
    assert_eq!(job_card["fields"][1]["kind"], "select");

    let (status, _) = send(&app, Method::GET, "/api/document-types/memo", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_save_reports_server_error() {
    let app = app_with(MemoryBackend::new().failing());
    let (status, body) = send(&app, Method::POST, "/api/documents", Some(gate_pass())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("not have been saved"));

    let (_, all) = send(&app, Method::GET, "/api/documents", None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}
