//! HttpVisitClient against an in-process visits endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use petclinic_client::{HttpVisitClient, VisitApi};
use petclinic_config::ClientConfig;
use petclinic_core::{NewVisit, Visit, VisitError, VisitScope};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Recorder {
    paths: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }
}

async fn list(State(rec): State<Recorder>, uri: Uri) -> Json<Value> {
    rec.paths.lock().unwrap().push(uri.path().to_string());
    Json(json!([{ "date": "2024-01-01", "description": "Checkup" }]))
}

async fn create(State(rec): State<Recorder>, uri: Uri, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    rec.paths.lock().unwrap().push(uri.path().to_string());
    rec.bodies.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(json!({ "id": 1, "petId": 7 })))
}

fn visits_router(rec: Recorder) -> Router {
    Router::new()
        .route(
            "/api/visit/owners/{owner_id}/pets/{pet_id}/visits",
            get(list).post(create),
        )
        .with_state(rec)
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base: &str) -> HttpVisitClient {
    let config = ClientConfig::builder().api_base(base).timeout_secs(5).build();
    // Local test servers must not be routed through an ambient HTTP proxy.
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(config.timeout())
        .build()
        .unwrap();
    HttpVisitClient::with_client(client, &config.api_base)
}

#[tokio::test]
async fn list_hits_scoped_path_and_returns_entries_unchanged() {
    let rec = Recorder::default();
    let base = spawn(visits_router(rec.clone())).await;
    let client = client_for(&base);

    let visits = client.list_visits(&VisitScope::new(42, 7)).await.unwrap();

    assert_eq!(
        visits,
        vec![Visit::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "Checkup")]
    );
    assert_eq!(rec.paths(), vec!["/api/visit/owners/42/pets/7/visits"]);
}

#[tokio::test]
async fn create_posts_formatted_payload() {
    let rec = Recorder::default();
    let base = spawn(visits_router(rec.clone())).await;
    let client = client_for(&format!("{}/", base));

    let visit = NewVisit::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), "Annual checkup");
    client.create_visit(&VisitScope::new(0, 3), &visit).await.unwrap();

    assert_eq!(rec.paths(), vec!["/api/visit/owners/0/pets/3/visits"]);
    assert_eq!(
        rec.bodies(),
        vec![json!({ "date": "2024-03-05", "description": "Annual checkup" })]
    );
}

#[tokio::test]
async fn server_error_is_retryable_status() {
    let app = Router::new().route(
        "/api/visit/owners/{owner_id}/pets/{pet_id}/visits",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "visits-service down") }),
    );
    let client = client_for(&spawn(app).await);

    let err = client.list_visits(&VisitScope::new(1, 1)).await.unwrap_err();

    match &err {
        VisitError::Status { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "visits-service down");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn rejected_submission_is_not_retryable() {
    let app = Router::new().route(
        "/api/visit/owners/{owner_id}/pets/{pet_id}/visits",
        axum::routing::post(|| async { (StatusCode::BAD_REQUEST, "bad date") }),
    );
    let client = client_for(&spawn(app).await);

    let visit = NewVisit::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), "");
    let err = client.create_visit(&VisitScope::new(1, 1), &visit).await.unwrap_err();

    assert!(matches!(err, VisitError::Status { status: 400, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn malformed_list_body_is_decode_error() {
    let app = Router::new().route(
        "/api/visit/owners/{owner_id}/pets/{pet_id}/visits",
        get(|| async { Json(json!({ "visits": "nope" })) }),
    );
    let client = client_for(&spawn(app).await);

    let err = client.list_visits(&VisitScope::new(1, 1)).await.unwrap_err();
    assert!(matches!(err, VisitError::Decode(_)));
}

#[tokio::test]
async fn connection_dropped_mid_body_is_retryable_request_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        // Promises 200 bytes, sends a fragment, then hangs up.
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n[{\"date\":",
            )
            .await;
        let _ = socket.shutdown().await;
    });

    let client = client_for(&format!("http://{}", addr));
    let err = client.list_visits(&VisitScope::new(1, 1)).await.unwrap_err();

    assert!(matches!(err, VisitError::Request(_)), "got {:?}", err);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr));
    let err = client.list_visits(&VisitScope::new(1, 1)).await.unwrap_err();

    assert!(matches!(err, VisitError::Request(_)));
    assert!(err.is_retryable());
}
