//! Observability configuration parsing from environment variables.

use super::{Lookup, parse_var};
use anyhow::Result;

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    /// Collect prediction metrics
    pub enabled: bool,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        Ok(Self {
            enabled: parse_var(lookup, "OBSERVABILITY_ENABLED", true)?,
        })
    }
}
