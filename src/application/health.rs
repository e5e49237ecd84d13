use crate::domain::ports::ChurnPredictor;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

pub const SERVICE_NAME: &str = "ChurnInsight Backend";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
    Degraded,
}

/// Best-effort service status. Building one never fails; an unreachable
/// ML service only degrades the overall status.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub backend: HealthStatus,
    /// Absent when the ML service was not probed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml: Option<HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ml_url: Option<String>,
    pub status: HealthStatus,
}

impl HealthReport {
    /// Backend-only report, without probing dependencies
    pub fn basic() -> Self {
        Self {
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            backend: HealthStatus::Up,
            ml: None,
            ml_url: None,
            status: HealthStatus::Up,
        }
    }

    pub async fn check(predictor: &dyn ChurnPredictor) -> Self {
        debug!("Probing ML service at {}", predictor.endpoint());
        let ml_up = predictor.is_healthy().await;
        if !ml_up {
            warn!("ML service at {} is down, reporting degraded", predictor.endpoint());
        }

        Self {
            ml: Some(if ml_up {
                HealthStatus::Up
            } else {
                HealthStatus::Down
            }),
            ml_url: Some(predictor.endpoint().to_string()),
            status: if ml_up {
                HealthStatus::Up
            } else {
                HealthStatus::Degraded
            },
            ..Self::basic()
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}
