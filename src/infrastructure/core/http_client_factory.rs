use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a plain HTTP client bounded by `timeout`.
    ///
    /// No retry middleware is installed: the prediction orchestrator owns
    /// retries so that only transport failures are re-attempted.
    pub fn create_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .context("Failed to build HTTP client")
    }
}
