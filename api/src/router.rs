/// Route table and cross-cutting layers.
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{self, HEALTH_PATH};
use crate::errors;
use crate::routes;
use crate::AppState;

/// Build the application router. Everything but the health probe is gated.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(HEALTH_PATH, get(routes::health))
        .route("/info", post(routes::info))
        .route("/download", post(routes::download))
        .route("/downloads", get(routes::list_downloads))
        .route(
            "/downloads/:filename",
            get(routes::serve_download).delete(routes::delete_download),
        )
        .fallback(routes::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key))
        .layer(CatchPanicLayer::custom(errors::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
