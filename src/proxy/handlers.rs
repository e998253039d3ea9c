use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, instrument};

use super::{
    client::BackendResponse,
    dto::{AnalyzeRequest, QueryRequest},
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

#[instrument(skip(state, payload))]
pub async fn query(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<BackendResponse, ApiError> {
    let body = match payload {
        Ok(Json(body)) if !body.question.trim().is_empty() => body,
        _ => return Err(ApiError::MissingField("question")),
    };

    info!(%user_id, "forwarding query");
    state.backend.forward("/query", &body).await
}

#[instrument(skip(state, payload))]
pub async fn analyze(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<BackendResponse, ApiError> {
    let body = match payload {
        Ok(Json(body)) if !body.repo_url.trim().is_empty() => body,
        _ => return Err(ApiError::MissingField("repo_url")),
    };

    info!(%user_id, repo_url = %body.repo_url, "forwarding analyze");
    state.backend.forward("/analyze", &body).await
}
