use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

use crate::config::DatabaseConfig;
use crate::models::notification::{CreateNotification, Notification};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Append-only persistence for notification attempts. There is no update
/// path; every attempt is an independent insert.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: CreateNotification) -> Result<(), Error>;
}

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, Error> {
        info!("Connecting to PostgreSQL");

        let conn_str = format!("{}/{}", config.uri.trim_end_matches('/'), config.name);

        let (client, connection) =
            tokio::time::timeout(CONNECT_TIMEOUT, tokio_postgres::connect(&conn_str, NoTls))
                .await
                .map_err(|_| anyhow!("Timed out connecting to database"))?
                .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

        // The connection object drives the socket and must be polled for
        // the lifetime of the client.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Database connection terminated");
            }
        });

        info!("PostgreSQL connection established");
        Ok(Self { client })
    }
}

#[async_trait]
impl NotificationStore for PostgresStore {
    async fn create(&self, notification: CreateNotification) -> Result<(), Error> {
        let record = Notification::from(notification);

        let payload = serde_json::to_value(&record.payload)
            .map_err(|e| anyhow!("Failed to serialize event payload: {}", e))?;

        self.client
            .execute(
                "INSERT INTO notifications \
                 (id, event_type, reference_id, user_id, payload, channel, status, \
                  error_detail, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                &[
                    &record.id,
                    &record.event_type,
                    &record.reference,
                    &record.user_id,
                    &payload,
                    &record.channel.as_str(),
                    &record.status.as_str(),
                    &record.error_detail,
                    &record.created_at,
                    &record.updated_at,
                ],
            )
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    reference = %record.reference,
                    "Failed to write notification record"
                );
                anyhow!("Database write failed: {}", e)
            })?;

        debug!(
            id = %record.id,
            event_type = %record.event_type,
            channel = %record.channel,
            status = %record.status,
            "Notification record written"
        );

        Ok(())
    }
}
