use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse, RegisterRequest, TokenResponse},
        services::{login_user, register_user},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "register body rejected");
        ApiError::InvalidInput
    })?;

    register_user(state.users.as_ref(), payload).await?;

    Ok(Json(MessageResponse {
        message: "Registration successful",
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "login body rejected");
        ApiError::InvalidInput
    })?;

    let token = login_user(state.users.as_ref(), &state.keys, payload).await?;
    Ok(Json(TokenResponse { token }))
}
