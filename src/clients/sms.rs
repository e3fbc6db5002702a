use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

use crate::clients::DeliveryChannel;
use crate::config::Config;
use crate::models::notification::Channel;

pub struct SmsSender {
    http_client: Client,
    gateway_url: String,
    enabled: bool,
}

impl SmsSender {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        let enabled = config.feature_enabled("enable_sms") && !config.sms_gateway_url.is_empty();
        info!(gateway = %config.sms_gateway_url, enabled, "SMS sender initialized");

        Ok(Self {
            http_client,
            gateway_url: config.sms_gateway_url.clone(),
            enabled,
        })
    }
}

#[async_trait]
impl DeliveryChannel for SmsSender {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send(
        &self,
        recipient: &str,
        _subject: Option<&str>,
        body: &str,
    ) -> Result<(), Error> {
        if !self.enabled {
            debug!(recipient, "SMS channel disabled, skipping send");
            return Ok(());
        }

        let response = self
            .http_client
            .post(&self.gateway_url)
            .json(&json!({ "to": recipient, "message": body }))
            .send()
            .await
            .map_err(|e| anyhow!("SMS gateway request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("SMS gateway returned status {}: {}", status, detail));
        }

        info!(recipient, "SMS sent");
        Ok(())
    }
}
