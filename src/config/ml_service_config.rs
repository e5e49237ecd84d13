//! ML service configuration parsing from environment variables.
//!
//! This module handles the predictor address, the per-call timeout and the
//! retry/backoff bounds applied by the prediction orchestrator.

use super::{Lookup, parse_var};
use crate::application::prediction::PredictionPolicy;
use anyhow::{Context, Result, ensure};
use std::time::Duration;
use url::Url;

/// ML service environment configuration
#[derive(Debug, Clone)]
pub struct MlServiceEnvConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry_max_attempts: u32,
    pub retry_min_backoff_ms: u64,
    pub retry_max_backoff_ms: u64,
    pub health_timeout_ms: u64,
}

impl Default for MlServiceEnvConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 3000,
            retry_max_attempts: 2,
            retry_min_backoff_ms: 100,
            retry_max_backoff_ms: 1000,
            health_timeout_ms: 2000,
        }
    }
}

impl MlServiceEnvConfig {
    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            base_url: lookup("ML_SERVICE_BASE_URL").unwrap_or(defaults.base_url),
            timeout_ms: parse_var(lookup, "ML_SERVICE_TIMEOUT_MS", defaults.timeout_ms)?,
            retry_max_attempts: parse_var(
                lookup,
                "ML_SERVICE_RETRY_MAX_ATTEMPTS",
                defaults.retry_max_attempts,
            )?,
            retry_min_backoff_ms: parse_var(
                lookup,
                "ML_SERVICE_RETRY_MIN_BACKOFF_MS",
                defaults.retry_min_backoff_ms,
            )?,
            retry_max_backoff_ms: parse_var(
                lookup,
                "ML_SERVICE_RETRY_MAX_BACKOFF_MS",
                defaults.retry_max_backoff_ms,
            )?,
            health_timeout_ms: parse_var(
                lookup,
                "ML_SERVICE_HEALTH_TIMEOUT_MS",
                defaults.health_timeout_ms,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .with_context(|| format!("Invalid ML_SERVICE_BASE_URL: {}", self.base_url))?;
        ensure!(self.timeout_ms > 0, "ML_SERVICE_TIMEOUT_MS must be > 0");
        ensure!(
            self.health_timeout_ms > 0,
            "ML_SERVICE_HEALTH_TIMEOUT_MS must be > 0"
        );
        ensure!(
            self.retry_min_backoff_ms <= self.retry_max_backoff_ms,
            "ML_SERVICE_RETRY_MIN_BACKOFF_MS ({}) must not exceed ML_SERVICE_RETRY_MAX_BACKOFF_MS ({})",
            self.retry_min_backoff_ms,
            self.retry_max_backoff_ms
        );
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn prediction_policy(&self) -> PredictionPolicy {
        PredictionPolicy {
            timeout: self.timeout(),
            max_retries: self.retry_max_attempts,
            min_backoff: Duration::from_millis(self.retry_min_backoff_ms),
            max_backoff: Duration::from_millis(self.retry_max_backoff_ms),
        }
    }
}
