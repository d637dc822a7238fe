//! Visits service entry point and Axum router setup.
//!
//! Opens the SQLite store, seeds sample visits on first run, and serves the
//! visit endpoints under the gateway's `api/visit` prefix.

mod db;
mod error;
mod handlers;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_ADDR: &str = "0.0.0.0:8082";
const DEFAULT_DATABASE_URL: &str = "data/visits.db";

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub db: Mutex<rusqlite::Connection>,
}

impl ServerState {
    /// Acquires the database lock, converting poison errors to AppError.
    pub fn db_lock(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>, error::AppError> {
        self.db.lock().map_err(|e| {
            tracing::error!("DB lock poisoned: {}", e);
            error::AppError::Internal("database lock error".into())
        })
    }
}

/// Builds the service router around the given state.
pub fn app(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route(
            "/api/visit/owners/{owner_id}/pets/{pet_id}/visits",
            get(handlers::visits::list).post(handlers::visits::create),
        )
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let db_path = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
    let conn = db::init_db(&db_path)?;
    db::seed_examples(&conn)?;

    let state = Arc::new(ServerState { db: Mutex::new(conn) });

    let addr = std::env::var("VISITS_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.into());
    info!("Starting visits service on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
