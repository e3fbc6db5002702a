pub mod config_service;
pub mod database;
pub mod email;
pub mod kafka;
pub mod sms;

use anyhow::Error;
use async_trait::async_trait;

use crate::models::notification::Channel;

/// A transport that can attempt to deliver one message to one recipient.
///
/// A disabled channel reports success without touching the network, so
/// operators can kill a channel instantly without a deploy.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    fn channel(&self) -> Channel;

    fn is_enabled(&self) -> bool;

    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> Result<(), Error>;
}
