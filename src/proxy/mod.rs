use axum::{middleware, routing::post, Router};

use crate::{auth::middleware::require_auth, state::AppState};

pub mod client;
mod dto;
pub mod handlers;

/// Protected `/api` routes. The auth gate wraps every route registered here.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/query", post(handlers::query))
        .route("/analyze", post(handlers::analyze))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
