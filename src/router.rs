use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Error, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::handlers::{
    HandlerContext, OrderCancelledHandler, OrderCreatedHandler, PaymentFailedHandler,
    PaymentSuccessHandler,
};

/// Decode-and-dispatch capability for one event family.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> Result<(), Error>;
}

/// Maps physical topic names to handlers. A topic without a handler is not
/// a pipeline failure; the message is skipped and the offset advances.
pub struct EventRouter {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers the built-in handlers under the physical names from the
    /// logical-to-physical topic mapping.
    pub fn with_default_handlers(config: &Config, context: Arc<HandlerContext>) -> Self {
        let mut router = Self::new();

        for (logical, physical) in &config.kafka.topics {
            let handler: Arc<dyn EventHandler> = match logical.as_str() {
                "order.created" => Arc::new(OrderCreatedHandler::new(context.clone())),
                "order.cancelled" => Arc::new(OrderCancelledHandler::new(context.clone())),
                "payment.success" => Arc::new(PaymentSuccessHandler::new(context.clone())),
                "payment.failed" => Arc::new(PaymentFailedHandler::new(context.clone())),
                other => {
                    warn!(event = other, "No handler for configured event, ignoring");
                    continue;
                }
            };

            debug!(event = %logical, topic = %physical, "Registered event handler");
            router.register(physical.clone(), handler);
        }

        router
    }

    pub fn register(&mut self, topic: impl Into<String>, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(topic.into(), handler);
    }

    /// Routes one message to its handler. Unrecognized topics are logged
    /// and treated as success.
    pub async fn route(&self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        match self.handlers.get(topic) {
            Some(handler) => handler.handle(payload).await,
            None => {
                warn!(topic, "Unknown topic, skipping message");
                Ok(())
            }
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}
