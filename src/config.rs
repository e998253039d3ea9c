use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub backend: BackendConfig,
    pub cors_origin: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let jwt = JwtConfig::new(secret)?;

        let backend = BackendConfig {
            url: std::env::var("BACKEND_URL").unwrap_or_else(|_| "http://ai_core:8000".into()),
            timeout_secs: parse_env("BACKEND_TIMEOUT_SECS")?.unwrap_or(120),
        };

        Ok(Self {
            database_url,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS")?.unwrap_or(10),
            jwt,
            backend,
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_env("APP_PORT")?.unwrap_or(8081),
        })
    }
}

impl JwtConfig {
    pub fn new(secret: String) -> anyhow::Result<Self> {
        anyhow::ensure!(!secret.trim().is_empty(), "JWT_SECRET must not be empty");
        Ok(Self { secret })
    }
}

/// Unset is `None`; set but unparsable is an error rather than a silent default.
fn parse_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(None),
    }
}
