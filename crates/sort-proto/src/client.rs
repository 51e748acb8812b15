//! Typed REST client for the classification backend.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::protocol::{
    ApiResponse, ClassificationRecord, ClassifyRequest, DeleteRequest, LatestClassification,
    ManualOverrideRequest, Stats, SystemStatus,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("backend returned status {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// True when the backend never answered (connection refused, timeout...).
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path or a server-relative image path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn system_status(&self) -> Result<SystemStatus, ApiError> {
        self.get_json("/api/system_status").await
    }

    /// Reachability probe: any 2xx is success, the body is ignored.
    pub async fn detection_status(&self) -> Result<(), ApiError> {
        let resp = self
            .http
            .get(self.url("/api/detection_status"))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        Ok(())
    }

    pub async fn latest_classification(&self) -> Result<LatestClassification, ApiError> {
        self.get_json("/api/latest_classification").await
    }

    pub async fn classifications(&self) -> Result<Vec<ClassificationRecord>, ApiError> {
        self.get_json("/api/classifications").await
    }

    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.get_json("/api/stats").await
    }

    pub async fn classify(&self, req: &ClassifyRequest) -> Result<(), ApiError> {
        self.post_action("/api/classify", req).await
    }

    pub async fn delete_classification(&self, filename: &str) -> Result<(), ApiError> {
        let req = DeleteRequest {
            filename: filename.to_string(),
        };
        self.post_action("/api/delete_classification", &req).await
    }

    pub async fn manual_override(&self, req: &ManualOverrideRequest) -> Result<(), ApiError> {
        self.post_action("/api/manual_override", req).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        resp.json().await.map_err(ApiError::Decode)
    }

    /// POST a JSON body and interpret the `{success, error}` envelope.
    ///
    /// The backend answers rejected requests with 4xx/5xx *and* a JSON body,
    /// so the body is read before the status is judged.
    async fn post_action<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let status = resp.status();
        match resp.json::<ApiResponse>().await {
            Ok(ApiResponse { success: true, .. }) => Ok(()),
            Ok(ApiResponse { error, .. }) => {
                debug!("{} rejected ({}): {:?}", path, status, error);
                Err(ApiError::Rejected(
                    error.unwrap_or_else(|| "Unknown error".to_string()),
                ))
            }
            Err(_) if !status.is_success() => Err(ApiError::Status(status)),
            Err(e) => Err(ApiError::Decode(e)),
        }
    }
}
