use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use rdkafka::{
    ClientConfig, Message, Offset, TopicPartitionList,
    consumer::{CommitMode, Consumer, StreamConsumer},
};
use tracing::info;

use crate::config::KafkaConfig;

/// One fetched broker message, detached from the client that produced it
/// so the loop can hold it across the routing call.
#[derive(Debug, Clone)]
pub struct SourceMessage {
    pub topic: String,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
    pub partition: i32,
    pub offset: i64,
}

/// The broker subscription as the consumer loop sees it: a blocking fetch
/// plus a per-message commit.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch(&self) -> Result<SourceMessage, Error>;

    async fn commit(&self, message: &SourceMessage) -> Result<(), Error>;

    fn close(&self);
}

pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    /// Builds the consumer and subscribes to the physical topics. Offsets
    /// are committed explicitly by the loop, never by the client.
    pub fn connect(config: &KafkaConfig) -> Result<Self, Error> {
        let topics = config.physical_topics();

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("fetch.min.bytes", "10000")
            .set("fetch.max.bytes", "10000000")
            .set("fetch.wait.max.ms", "1000")
            .create()
            .map_err(|e| anyhow!("Failed to create Kafka consumer: {}", e))?;

        consumer
            .subscribe(&topics)
            .map_err(|e| anyhow!("Failed to subscribe to topics: {}", e))?;

        info!(?topics, group_id = %config.group_id, "Kafka consumer subscribed");
        Ok(Self { consumer })
    }
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn fetch(&self) -> Result<SourceMessage, Error> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| anyhow!("Fetch failed: {}", e))?;

        Ok(SourceMessage {
            topic: message.topic().to_string(),
            key: message.key().map(|k| k.to_vec()),
            payload: message.payload().map(|p| p.to_vec()).unwrap_or_default(),
            partition: message.partition(),
            offset: message.offset(),
        })
    }

    async fn commit(&self, message: &SourceMessage) -> Result<(), Error> {
        let mut offsets = TopicPartitionList::new();
        offsets
            .add_partition_offset(
                &message.topic,
                message.partition,
                Offset::Offset(message.offset + 1),
            )
            .map_err(|e| anyhow!("Invalid commit offset: {}", e))?;

        self.consumer
            .commit(&offsets, CommitMode::Async)
            .map_err(|e| anyhow!("Commit failed: {}", e))?;

        Ok(())
    }

    fn close(&self) {
        self.consumer.unsubscribe();
    }
}
