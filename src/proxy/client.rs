use anyhow::Context;
use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::{config::BackendConfig, error::ApiError};

/// Status and raw body returned by the inference service, relayed as-is.
#[derive(Debug)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl IntoResponse for BackendResponse {
    fn into_response(self) -> Response {
        (self.status, [(CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

/// HTTP client for the single upstream inference service.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("build backend http client")?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POSTs `body` as JSON. Connect failures and timeouts (including one
    /// that fires while the body streams in) are `BackendUnavailable`; a body
    /// cut short by the backend is `BackendRead`.
    pub async fn forward<T>(&self, path: &str, body: &T) -> Result<BackendResponse, ApiError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.url_for(path);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    error!(error = %e, %url, "failed to build backend request");
                    ApiError::Internal
                } else {
                    warn!(error = %e, %url, timeout = e.is_timeout(), "backend unreachable");
                    ApiError::BackendUnavailable
                }
            })?;

        let status = StatusCode::from_u16(resp.status().as_u16()).map_err(|e| {
            error!(error = %e, "backend returned unusable status");
            ApiError::BackendRead
        })?;
        let body = resp.bytes().await.map_err(|e| {
            if e.is_timeout() {
                warn!(error = %e, %url, "backend timed out mid-body");
                ApiError::BackendUnavailable
            } else {
                error!(error = %e, %url, "failed to read backend response");
                ApiError::BackendRead
            }
        })?;

        debug!(%url, %status, bytes = body.len(), "backend responded");
        Ok(BackendResponse { status, body })
    }
}
