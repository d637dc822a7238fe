//! Visit list and create handlers.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use petclinic_core::{NewVisit, Visit};
use tracing::{debug, info};

use crate::error::AppError;
use crate::ServerState;

/// Lists the visits recorded for a pet.
///
/// The owner segment is part of the gateway path but does not scope storage.
pub async fn list(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<(u32, u32)>, PathRejection>,
) -> Result<Json<Vec<Visit>>, AppError> {
    let Path((owner_id, pet_id)) = path?;
    debug!("Listing visits for owner {} pet {}", owner_id, pet_id);
    let visits = {
        let db = state.db_lock()?;
        crate::db::list_visits(&db, pet_id)?
    };
    Ok(Json(visits))
}

/// Records a visit for a pet.
pub async fn create(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<(u32, u32)>, PathRejection>,
    payload: Result<Json<NewVisit>, JsonRejection>,
) -> Result<(StatusCode, Json<Visit>), AppError> {
    let Path((owner_id, pet_id)) = path?;
    let Json(visit) = payload?;
    info!("Recording visit on {} for owner {} pet {}", visit.date, owner_id, pet_id);

    let stored = {
        let db = state.db_lock()?;
        crate::db::insert_visit(&db, pet_id, &visit)?
    };
    Ok((StatusCode::CREATED, Json(stored)))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> Router {
        let conn = crate::db::init_db(":memory:").unwrap();
        crate::app(Arc::new(ServerState { db: Mutex::new(conn) }))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn create_then_list() {
        let app = test_app();
        let uri = "/api/visit/owners/42/pets/7/visits";

        let (status, created) = send(
            &app,
            Method::POST,
            uri,
            Some(json!({ "date": "2024-03-05", "description": "Annual checkup" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            created,
            json!({ "id": 1, "date": "2024-03-05", "description": "Annual checkup", "petId": 7 })
        );

        let (status, listed) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([created]));
    }

    #[tokio::test]
    async fn empty_pet_lists_nothing() {
        let app = test_app();
        let (status, listed) = send(&app, Method::GET, "/api/visit/owners/0/pets/0/visits", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn bad_date_is_rejected_as_json_error() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/visit/owners/1/pets/1/visits",
            Some(json!({ "date": "03/05/2024", "description": "x" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn non_numeric_ids_are_rejected_as_json_error() {
        let app = test_app();

        let (status, body) = send(&app, Method::GET, "/api/visit/owners/abc/pets/1/visits", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/visit/owners/1/pets/-3/visits",
            Some(json!({ "date": "2024-03-05", "description": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/api/vets", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "no route for /api/vets" }));
    }
}
