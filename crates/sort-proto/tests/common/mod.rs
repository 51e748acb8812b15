//! In-process mock of the classification backend.
//!
//! Each test gets its own server on an ephemeral port; the shared
//! `MockState` lets the test flip responses and inspect what was posted.
#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sort_proto::client::BackendClient;
use sort_proto::protocol::{
    ClassificationRecord, ClassifyRequest, DeleteRequest, LatestClassification,
    ManualOverrideRequest, Stats, SystemStatus,
};
use tokio::net::TcpListener;

#[derive(Default)]
pub struct MockState {
    /// `None` answers 503.
    pub status: Option<SystemStatus>,
    pub latest: Option<LatestClassification>,
    pub detection_reachable: bool,
    pub records: Vec<ClassificationRecord>,
    pub stats: Stats,
    /// Deletes for these filenames answer `{success: false}`.
    pub reject_deletes: HashSet<String>,
    pub deleted: Vec<String>,
    pub classified: Vec<ClassifyRequest>,
    pub overrides: Vec<ManualOverrideRequest>,
    pub calls: Vec<&'static str>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockBackend {
    pub async fn start(state: MockState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route("/api/system_status", get(system_status))
            .route("/api/detection_status", get(detection_status))
            .route("/api/latest_classification", get(latest_classification))
            .route("/api/classifications", get(classifications))
            .route("/api/stats", get(stats))
            .route("/api/classify", post(classify))
            .route("/api/delete_classification", post(delete_classification))
            .route("/api/manual_override", post(manual_override))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn client(&self) -> BackendClient {
        BackendClient::new(format!("http://{}", self.addr), Duration::from_secs(2)).unwrap()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }
}

/// A client pointed at a port nothing listens on.
pub async fn dead_client() -> BackendClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    BackendClient::new(format!("http://{}", addr), Duration::from_millis(500)).unwrap()
}

pub fn record(filename: &str, classification: &str, confidence: f64) -> ClassificationRecord {
    ClassificationRecord {
        filename: filename.to_string(),
        image_path: format!("images/{}", filename),
        frame_number: Some(1),
        date: "2026-03-01 12:00:00".to_string(),
        file_size_mb: 0.25,
        classification: classification.to_string(),
        confidence,
        manual_override: false,
    }
}

async fn system_status(State(state): State<Shared>) -> Response {
    let mut s = state.lock().unwrap();
    s.calls.push("system_status");
    match s.status.clone() {
        Some(status) => Json(status).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn detection_status(State(state): State<Shared>) -> Response {
    let mut s = state.lock().unwrap();
    s.calls.push("detection_status");
    if s.detection_reachable {
        Json(json!({"running": false, "message": "Detection system is not running"}))
            .into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

async fn latest_classification(State(state): State<Shared>) -> Response {
    let mut s = state.lock().unwrap();
    s.calls.push("latest_classification");
    match s.latest.clone() {
        Some(latest) => Json(latest).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn classifications(State(state): State<Shared>) -> Json<Vec<ClassificationRecord>> {
    let mut s = state.lock().unwrap();
    s.calls.push("classifications");
    Json(s.records.clone())
}

async fn stats(State(state): State<Shared>) -> Json<Stats> {
    let mut s = state.lock().unwrap();
    s.calls.push("stats");
    Json(s.stats.clone())
}

async fn classify(State(state): State<Shared>, Json(req): Json<ClassifyRequest>) -> Response {
    let mut s = state.lock().unwrap();
    s.calls.push("classify");
    if req.classification.is_empty() {
        return Json(json!({"success": false, "error": "Missing filename or classification"}))
            .into_response();
    }
    s.classified.push(req);
    Json(json!({"success": true})).into_response()
}

async fn delete_classification(
    State(state): State<Shared>,
    Json(req): Json<DeleteRequest>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.calls.push("delete_classification");
    if s.reject_deletes.contains(&req.filename) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": "file is locked"})),
        )
            .into_response();
    }
    s.deleted.push(req.filename);
    Json(json!({"success": true, "message": "Classification deleted successfully"}))
        .into_response()
}

async fn manual_override(
    State(state): State<Shared>,
    Json(req): Json<ManualOverrideRequest>,
) -> Response {
    let mut s = state.lock().unwrap();
    s.calls.push("manual_override");
    s.overrides.push(req);
    Json(json!({"success": true})).into_response()
}
