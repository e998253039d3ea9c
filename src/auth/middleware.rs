//! Bearer-token gate for the protected `/api` routes.
//!
//! Each filter either admits the request to the next step or rejects it
//! with a 401. The filters run in a fixed order:
//! header present, `Bearer ` scheme, token verification.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    auth::{extractors::AuthUser, jwt::JwtKeys},
    error::ApiError,
};

const BEARER_PREFIX: &str = "Bearer ";

/// An empty value counts as absent.
fn authorization_header(headers: &HeaderMap) -> Result<&HeaderValue, ApiError> {
    headers
        .get(AUTHORIZATION)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingAuthHeader)
}

/// Scheme match is case-sensitive with exactly one space.
fn bearer_token(value: &HeaderValue) -> Result<&str, ApiError> {
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .ok_or(ApiError::BearerRequired)
}

fn verified_subject(keys: &JwtKeys, token: &str) -> Result<AuthUser, ApiError> {
    keys.verify(token).map(|c| AuthUser(c.sub)).map_err(|e| {
        warn!(reason = %e, "token rejected");
        ApiError::InvalidToken
    })
}

/// Runs the filter chain against the request headers.
pub fn authorize(headers: &HeaderMap, keys: &JwtKeys) -> Result<AuthUser, ApiError> {
    let value = authorization_header(headers)?;
    let token = bearer_token(value)?;
    verified_subject(keys, token)
}

pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authorize(req.headers(), &keys)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
