use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, info};

use crate::clients::DeliveryChannel;
use crate::config::Config;
use crate::models::notification::Channel;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct EmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    enabled: bool,
}

impl EmailSender {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let smtp = &config.smtp;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
            .port(smtp.port)
            .timeout(Some(SMTP_TIMEOUT));

        if !smtp.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                smtp.user.clone(),
                smtp.password.clone(),
            ));
        }

        let from: Mailbox = smtp
            .from
            .parse()
            .map_err(|e| anyhow!("Invalid SMTP from address '{}': {}", smtp.from, e))?;

        let enabled = config.feature_enabled("enable_email");
        info!(host = %smtp.host, enabled, "Email sender initialized");

        Ok(Self {
            transport: builder.build(),
            from,
            enabled,
        })
    }
}

#[async_trait]
impl DeliveryChannel for EmailSender {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> Result<(), Error> {
        if !self.enabled {
            debug!(recipient, "Email channel disabled, skipping send");
            return Ok(());
        }

        let to: Mailbox = recipient
            .parse()
            .map_err(|e| anyhow!("Invalid recipient address '{}': {}", recipient, e))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject.unwrap_or_default())
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| anyhow!("Failed to build email message: {}", e))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        info!(
            recipient,
            subject = subject.unwrap_or_default(),
            "Email sent"
        );
        Ok(())
    }
}
