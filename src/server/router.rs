use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post},
};

use super::handlers;
use crate::config::EngineConfig;
use crate::cow::CowEngine;
use crate::store::{SqliteStore, Store};

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub engine: CowEngine,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<SqliteStore>, config: EngineConfig) -> Self {
        Self {
            store: store.clone(),
            engine: CowEngine::new(store, config),
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Copy for edit
        .route(
            "/recipes/{id}/copy-for-edit",
            post(handlers::copy_recipe_for_edit),
        )
        .route(
            "/ingredients/{id}/copy-for-edit",
            post(handlers::copy_ingredient_for_edit),
        )
        .route(
            "/collections/{id}/copy-for-edit",
            post(handlers::copy_collection_for_edit),
        )
        .route("/cascade", post(handlers::cascade))
        // Deletion and cleanup
        .route("/recipes/{id}", delete(handlers::delete_recipe))
        .route("/recipes/{id}/cleanup", post(handlers::cleanup_recipe))
        // Subscriptions
        .route(
            "/collections/{id}/subscription",
            post(handlers::subscribe).delete(handlers::unsubscribe),
        )
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
