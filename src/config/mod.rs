//! Configuration module for churninsight.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: ML service, Persistence, and Observability.

mod ml_service_config;
mod observability_config;
mod persistence_config;

pub use ml_service_config::MlServiceEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use persistence_config::PersistenceEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Source of configuration values, keyed by variable name
pub type Lookup = dyn Fn(&str) -> Option<String>;

/// Parse `key` from the lookup, falling back to `default` when unset.
/// A value that is set but malformed is an error.
pub(crate) fn parse_var<T>(lookup: &Lookup, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}

/// Main application configuration.
///
/// Aggregates all sub-configurations. Values are read once at startup and
/// never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub ml_service: MlServiceEnvConfig,
    pub persistence: PersistenceEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let ml_service =
            MlServiceEnvConfig::from_lookup(lookup).context("Failed to load ML service config")?;
        let persistence = PersistenceEnvConfig::from_lookup(lookup)
            .context("Failed to load persistence config")?;
        let observability = ObservabilityEnvConfig::from_lookup(lookup)
            .context("Failed to load observability config")?;

        Ok(Self {
            ml_service,
            persistence,
            observability,
        })
    }
}
