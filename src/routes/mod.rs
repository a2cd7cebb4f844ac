mod auth;
mod main;

use axum::Router;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router, registering each handler group once.
pub fn app_router(state: AppState) -> Router {
    let cors_layer = if state.config.allow_all_cors() {
        CorsLayer::permissive()
    } else {
        let origins = state
            .config
            .cors_origins()
            .into_iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .merge(auth::routes())
        .merge(main::routes())
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}
