use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tracing::warn;

use crate::clients::DeliveryChannel;
use crate::clients::database::NotificationStore;
use crate::models::event::{EventPayload, OrderCancelledEvent, OrderCreatedEvent, PaymentEvent};
use crate::models::notification::{Channel, CreateNotification};
use crate::router::EventHandler;
use crate::templates;

/// Dependencies shared by every handler, constructed once at startup and
/// read-only afterwards.
pub struct HandlerContext {
    pub store: Arc<dyn NotificationStore>,
    pub email: Arc<dyn DeliveryChannel>,
    pub sms: Arc<dyn DeliveryChannel>,
    pub fallback_email: String,
    pub fallback_phone: String,
}

impl HandlerContext {
    /// Delivers one message and records the attempt. The persisted record
    /// is the system of record for delivery failures, so a failed send is
    /// swallowed here; only a failure to write the record propagates.
    async fn deliver_and_record(
        &self,
        channel: &Arc<dyn DeliveryChannel>,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
        record: CreateNotification,
    ) -> Result<(), Error> {
        let record = match channel.send(recipient, subject, body).await {
            Ok(()) => record,
            Err(e) => {
                warn!(
                    channel = %channel.channel(),
                    recipient,
                    error = %e,
                    "Delivery failed"
                );
                record.failed(e.to_string())
            }
        };

        self.store.create(record).await
    }

    // TODO: resolve recipients from the user service instead of trusting
    // the event payload; the configured fallback is a stopgap.
    fn email_recipient(&self, embedded: &Option<String>) -> String {
        match embedded {
            Some(address) if !address.is_empty() => address.clone(),
            _ => self.fallback_email.clone(),
        }
    }

    fn sms_recipient(&self, embedded: &Option<String>) -> String {
        match embedded {
            Some(number) if !number.is_empty() => number.clone(),
            _ => self.fallback_phone.clone(),
        }
    }
}

pub struct OrderCreatedHandler {
    context: Arc<HandlerContext>,
}

impl OrderCreatedHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl EventHandler for OrderCreatedHandler {
    async fn handle(&self, payload: &[u8]) -> Result<(), Error> {
        let event: OrderCreatedEvent = serde_json::from_slice(payload)
            .map_err(|e| anyhow!("Invalid order.created payload: {}", e))?;

        let recipient = self.context.email_recipient(&event.user_email);
        let (subject, body) = templates::order_created_email(&event.order_id);

        let mut record = CreateNotification::new(
            "order.created",
            event.order_id.clone(),
            EventPayload::OrderCreated(event.clone()),
            Channel::Email,
        );
        if let Some(user_id) = &event.user_id {
            record = record.with_user(user_id.clone());
        }

        self.context
            .deliver_and_record(&self.context.email, &recipient, Some(&subject), &body, record)
            .await
    }
}

pub struct OrderCancelledHandler {
    context: Arc<HandlerContext>,
}

impl OrderCancelledHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl EventHandler for OrderCancelledHandler {
    async fn handle(&self, payload: &[u8]) -> Result<(), Error> {
        let event: OrderCancelledEvent = serde_json::from_slice(payload)
            .map_err(|e| anyhow!("Invalid order.cancelled payload: {}", e))?;

        let recipient = self.context.email_recipient(&event.user_email);
        let (subject, body) = templates::order_cancelled_email(&event.order_id);

        let mut record = CreateNotification::new(
            "order.cancelled",
            event.order_id.clone(),
            EventPayload::OrderCancelled(event.clone()),
            Channel::Email,
        );
        if let Some(user_id) = &event.user_id {
            record = record.with_user(user_id.clone());
        }

        self.context
            .deliver_and_record(&self.context.email, &recipient, Some(&subject), &body, record)
            .await
    }
}

pub struct PaymentSuccessHandler {
    context: Arc<HandlerContext>,
}

impl PaymentSuccessHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl EventHandler for PaymentSuccessHandler {
    async fn handle(&self, payload: &[u8]) -> Result<(), Error> {
        let event: PaymentEvent = serde_json::from_slice(payload)
            .map_err(|e| anyhow!("Invalid payment.success payload: {}", e))?;

        let recipient = self.context.email_recipient(&event.user_email);
        let (subject, body) = templates::payment_success_email(
            &event.order_id,
            event.status.as_deref().unwrap_or("PAID"),
        );

        let record = CreateNotification::new(
            "payment.success",
            event.order_id.clone(),
            EventPayload::Payment(event.clone()),
            Channel::Email,
        );

        self.context
            .deliver_and_record(&self.context.email, &recipient, Some(&subject), &body, record)
            .await
    }
}

/// Payment failures notify over both channels: a receipt-style email plus
/// an SMS alert, each producing its own record.
pub struct PaymentFailedHandler {
    context: Arc<HandlerContext>,
}

impl PaymentFailedHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl EventHandler for PaymentFailedHandler {
    async fn handle(&self, payload: &[u8]) -> Result<(), Error> {
        let event: PaymentEvent = serde_json::from_slice(payload)
            .map_err(|e| anyhow!("Invalid payment.failed payload: {}", e))?;

        let recipient = self.context.email_recipient(&event.user_email);
        let (subject, body) = templates::payment_failed_email(&event.order_id);

        let record = CreateNotification::new(
            "payment.failed",
            event.order_id.clone(),
            EventPayload::Payment(event.clone()),
            Channel::Email,
        );

        self.context
            .deliver_and_record(&self.context.email, &recipient, Some(&subject), &body, record)
            .await?;

        let sms_recipient = self.context.sms_recipient(&event.user_phone);
        let text = templates::payment_failed_sms(&event.order_id);

        let record = CreateNotification::new(
            "payment.failed",
            event.order_id.clone(),
            EventPayload::Payment(event.clone()),
            Channel::Sms,
        );

        self.context
            .deliver_and_record(&self.context.sms, &sms_recipient, None, &text, record)
            .await
    }
}
