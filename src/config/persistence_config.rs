//! Persistence configuration parsing from environment variables.

use super::Lookup;
use anyhow::{Result, ensure};

/// Persistence environment configuration
#[derive(Debug, Clone)]
pub struct PersistenceEnvConfig {
    pub database_url: String,
}

impl Default for PersistenceEnvConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/churninsight.db".to_string(),
        }
    }
}

impl PersistenceEnvConfig {
    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or(Self::default().database_url);
        ensure!(
            database_url.starts_with("sqlite:"),
            "DATABASE_URL must be a sqlite URL, got {}",
            database_url
        );
        Ok(Self { database_url })
    }
}
