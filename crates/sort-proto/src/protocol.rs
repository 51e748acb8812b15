use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Classification label the detector emits when it could not decide.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// `GET /api/latest_classification`: the most recent detector result.
///
/// When nothing recent exists the backend answers with
/// `{classification: null, confidence: 0, detection_active: false}` and no
/// timestamp at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LatestClassification {
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub detection_active: bool,
}

impl LatestClassification {
    /// True when the record carries an actual label from a running detector.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self.classification.as_deref(), Some(c) if !c.is_empty() && c != "null")
            && self.detection_active
    }

    /// True when the detector reported the "could not decide" label.
    pub fn is_unknown(&self) -> bool {
        self.classification
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(UNKNOWN_LABEL))
    }
}

/// `GET /api/system_status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SystemStatus {
    #[serde(default)]
    pub system_ready: bool,
    #[serde(default)]
    pub detection_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SystemStatus {
    /// Either flag means the detection pipeline is up.
    pub fn is_up(&self) -> bool {
        self.system_ready || self.detection_active
    }

    /// Both flags: the signal the push fallback waits for.
    pub fn is_fully_ready(&self) -> bool {
        self.system_ready && self.detection_active
    }
}

/// One entry of `GET /api/classifications`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationRecord {
    pub filename: String,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub frame_number: Option<u64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub file_size_mb: f64,
    #[serde(default = "unknown_label")]
    pub classification: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub manual_override: bool,
}

impl ClassificationRecord {
    pub fn is_unknown(&self) -> bool {
        self.classification == UNKNOWN_LABEL
    }
}

fn unknown_label() -> String {
    UNKNOWN_LABEL.to_string()
}

/// `GET /api/stats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Stats {
    #[serde(default)]
    pub total_images: u64,
    #[serde(default)]
    pub total_classified: u64,
    #[serde(default)]
    pub unclassified: u64,
    #[serde(default)]
    pub average_confidence: f64,
    #[serde(default)]
    pub classification_counts: BTreeMap<String, u64>,
}

/// `POST /api/classify`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifyRequest {
    pub filename: String,
    pub classification: String,
    pub confidence: f64,
}

/// `POST /api/delete_classification`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteRequest {
    pub filename: String,
}

/// `POST /api/manual_override`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualOverrideRequest {
    pub classification: String,
    pub confidence: f64,
    pub timestamp: String,
}

impl ManualOverrideRequest {
    /// Operator overrides are always recorded at full confidence.
    pub fn new(classification: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            classification: classification.into(),
            confidence: 100.0,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Body returned by every mutating endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One line of the push channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushEvent {
    pub event: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl PushEvent {
    pub const REFRESH_PAGE: &'static str = "refresh_page";

    pub fn is_refresh(&self) -> bool {
        self.event == Self::REFRESH_PAGE
    }
}
