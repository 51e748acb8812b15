//! Backend availability detection.
//!
//! Startup runs three probes in order and stops at the first that says the
//! detection pipeline is usable:
//!
//! 1. `/api/system_status`: ready when `system_ready || detection_active`
//! 2. `/api/latest_classification`: ready unless `detection_active` is false
//! 3. `/api/detection_status`: any 2xx means "reachable, show it anyway"

use tracing::debug;

use crate::client::{ApiError, BackendClient};

/// Which probe established availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Status,
    Latest,
    Reachable,
}

impl Probe {
    pub fn label(self) -> &'static str {
        match self {
            Probe::Status => "system status",
            Probe::Latest => "latest classification",
            Probe::Reachable => "reachability",
        }
    }
}

/// Run the full startup probe sequence once.
pub async fn probe(client: &BackendClient) -> Result<Probe, ApiError> {
    match client.system_status().await {
        Ok(status) if status.is_up() => return Ok(Probe::Status),
        Ok(status) => debug!(
            "[availability] primary: not ready (system_ready={} detection_active={})",
            status.system_ready, status.detection_active
        ),
        Err(e) => debug!("[availability] primary failed: {}", e),
    }

    match client.latest_classification().await {
        Ok(latest) if latest.detection_active => return Ok(Probe::Latest),
        Ok(_) => debug!("[availability] fallback: detection_active is false"),
        Err(e) => debug!("[availability] fallback failed: {}", e),
    }

    match client.detection_status().await {
        Ok(()) => Ok(Probe::Reachable),
        Err(e) => {
            debug!("[availability] backend not reachable: {}", e);
            Err(e)
        }
    }
}

/// The periodic monitor check: true when status reports either flag.
pub async fn monitor_ready(client: &BackendClient) -> bool {
    match client.system_status().await {
        Ok(status) => status.is_up(),
        Err(e) => {
            debug!("[monitor] status check failed: {}", e);
            false
        }
    }
}
