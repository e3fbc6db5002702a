use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::event::EventPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Email,
    Sms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "EMAIL",
            Channel::Sms => "SMS",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "SENT",
            DeliveryStatus::Failed => "FAILED",
        }
    }
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// One dispatch attempt, before the store assigns an id and timestamps.
///
/// Starts out as a SENT record; `failed` downgrades it, which is the only
/// way `error_detail` gets set.
#[derive(Debug, Clone, Serialize)]
pub struct CreateNotification {
    pub event_type: String,
    pub reference: String,
    pub user_id: Option<String>,
    pub payload: EventPayload,
    pub channel: Channel,
    pub status: DeliveryStatus,
    pub error_detail: Option<String>,
}

impl CreateNotification {
    pub fn new(
        event_type: impl Into<String>,
        reference: impl Into<String>,
        payload: EventPayload,
        channel: Channel,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            reference: reference.into(),
            user_id: None,
            payload,
            channel,
            status: DeliveryStatus::Sent,
            error_detail: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn failed(mut self, detail: impl Into<String>) -> Self {
        self.status = DeliveryStatus::Failed;
        self.error_detail = Some(detail.into());
        self
    }
}

/// The durable record of one dispatch attempt. Records are never mutated
/// after creation, so `created_at` and `updated_at` coincide.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub event_type: String,
    pub reference: String,
    pub user_id: Option<String>,
    pub payload: EventPayload,
    pub channel: Channel,
    pub status: DeliveryStatus,
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CreateNotification> for Notification {
    fn from(create: CreateNotification) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            event_type: create.event_type,
            reference: create.reference,
            user_id: create.user_id,
            payload: create.payload,
            channel: create.channel,
            status: create.status,
            error_detail: create.error_detail,
            created_at: now,
            updated_at: now,
        }
    }
}
