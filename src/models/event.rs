use serde::{Deserialize, Serialize};

/// Emitted by the order service when a customer places an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order_id: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub amount: f64,

    #[serde(default)]
    pub user_email: Option<String>,
}

/// Emitted by the order service when an order is cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledEvent {
    pub order_id: String,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub user_email: Option<String>,
}

/// Shared shape for payment.success and payment.failed events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub order_id: String,

    #[serde(default)]
    pub payment_id: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub user_email: Option<String>,

    #[serde(default)]
    pub user_phone: Option<String>,
}

/// Snapshot of the decoded event, stored with each notification record for
/// audit and replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum EventPayload {
    #[serde(rename = "order.created")]
    OrderCreated(OrderCreatedEvent),

    #[serde(rename = "order.cancelled")]
    OrderCancelled(OrderCancelledEvent),

    #[serde(rename = "payment")]
    Payment(PaymentEvent),
}
