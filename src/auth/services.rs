use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::{StoreError, User},
    },
    error::ApiError,
};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    // Verified against when the email is unknown so both login failures cost the same.
    static ref DUMMY_HASH: Option<String> = hash_password("codescribe-dummy-password").ok();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub async fn register_user(
    store: &dyn UserStore,
    payload: RegisterRequest,
) -> Result<User, ApiError> {
    let email = payload.email.trim().to_string();
    if email.is_empty() || payload.password.is_empty() || !is_valid_email(&email) {
        warn!("register rejected: invalid input");
        return Err(ApiError::InvalidInput);
    }

    let password = payload.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "hash task failed");
            ApiError::HashFailed
        })?
        .map_err(|e| {
            error!(error = %e, "hash_password failed");
            ApiError::HashFailed
        })?;

    match store.create(&email, &hash).await {
        Ok(user) => {
            info!(user_id = %user.id, "user registered");
            Ok(user)
        }
        Err(StoreError::EmailTaken) => {
            warn!(email = %email, "email already registered");
            Err(ApiError::EmailTaken)
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            Err(ApiError::Internal)
        }
    }
}

/// Unknown email and wrong password both end in `InvalidCredentials`.
pub async fn login_user(
    store: &dyn UserStore,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> Result<String, ApiError> {
    let email = payload.email.trim().to_string();
    if email.is_empty() || payload.password.is_empty() {
        warn!("login rejected: invalid input");
        return Err(ApiError::InvalidInput);
    }

    let user = match store.find_by_email(&email).await {
        Ok(u) => Some(u),
        Err(StoreError::NotFound) => None,
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::Internal);
        }
    };

    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let password = payload.password;
    // DUMMY_HASH is first forced here, so its Argon2 run stays off the async workers.
    let matches = tokio::task::spawn_blocking(move || {
        stored
            .or_else(|| DUMMY_HASH.clone())
            .map_or(false, |d| verify_password(&password, &d))
    })
    .await
    .map_err(|e| {
        error!(error = %e, "verify task failed");
        ApiError::Internal
    })?;

    let user = match user {
        Some(u) if matches => u,
        Some(u) => {
            warn!(user_id = %u.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }
        None => {
            warn!("login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = keys.issue(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::TokenSigning
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(token)
}
