use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clients::kafka::MessageSource;
use crate::router::EventRouter;

const FETCH_BACKOFF: Duration = Duration::from_secs(1);

/// Sequential fetch-process-commit loop over one broker subscription.
///
/// Within a partition, messages are processed and committed strictly in
/// fetch order; there is no concurrent in-flight processing. Throughput
/// scales by running more processes in the same consumer group.
pub struct ConsumerLoop {
    source: Arc<dyn MessageSource>,
    router: EventRouter,
    shutdown: CancellationToken,
}

impl ConsumerLoop {
    pub fn new(
        source: Arc<dyn MessageSource>,
        router: EventRouter,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            router,
            shutdown,
        }
    }

    /// Runs until the shutdown token fires. The loop only exits between a
    /// commit and the next fetch, so no in-flight message is abandoned
    /// mid-step.
    pub async fn run(self) {
        info!("Consumer loop started");

        loop {
            let fetched = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                fetched = self.source.fetch() => fetched,
            };

            let message = match fetched {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, "Error fetching message");
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = sleep(FETCH_BACKOFF) => {}
                    }
                    continue;
                }
            };

            debug!(
                topic = %message.topic,
                partition = message.partition,
                offset = message.offset,
                "Received message"
            );

            // A poison message must never wedge the partition: processing
            // errors do not block offset advancement.
            if let Err(e) = self.router.route(&message.topic, &message.payload).await {
                error!(
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    "Error processing message"
                );
            }

            if let Err(e) = self.source.commit(&message).await {
                warn!(
                    topic = %message.topic,
                    partition = message.partition,
                    offset = message.offset,
                    error = %e,
                    "Error committing offset"
                );
            }
        }

        self.source.close();
        info!("Consumer loop stopped");
    }
}
