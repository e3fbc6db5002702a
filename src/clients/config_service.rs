use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::RemoteConfig;

const FETCH_ATTEMPTS: u32 = 10;
const FETCH_RETRY_DELAY: Duration = Duration::from_secs(2);
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-service configuration blob, serialized as a string so the config
/// service stays schema-agnostic.
#[derive(Debug, Deserialize)]
struct GetConfigResponse {
    config_json: String,
}

pub struct ConfigServiceClient {
    http_client: Client,
    base_url: String,
}

impl ConfigServiceClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches the configuration for a service, retrying on a fixed cadence.
    /// Exhausting the attempts is fatal to startup, by contract.
    pub async fn fetch(&self, service_name: &str) -> Result<RemoteConfig, Error> {
        let url = format!("{}/api/v1/configs/{}", self.base_url, service_name);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.fetch_once(&url).await {
                Ok(config) => {
                    info!(service = service_name, attempt, "Remote configuration fetched");
                    return Ok(config);
                }
                Err(e) => {
                    if attempt >= FETCH_ATTEMPTS {
                        return Err(anyhow!(
                            "Failed to fetch config from {} after {} attempts: {}",
                            url,
                            FETCH_ATTEMPTS,
                            e
                        ));
                    }

                    warn!(
                        attempt,
                        max_attempts = FETCH_ATTEMPTS,
                        error = %e,
                        "Failed to fetch config, retrying"
                    );
                    sleep(FETCH_RETRY_DELAY).await;
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<RemoteConfig, Error> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Config service request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Config service returned status {}", status));
        }

        let body: GetConfigResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse config response: {}", e))?;

        let config: RemoteConfig = serde_json::from_str(&body.config_json)
            .map_err(|e| anyhow!("Failed to parse config json: {}", e))?;

        Ok(config)
    }
}
