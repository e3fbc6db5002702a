use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use anyhow::{Error, anyhow};
use async_trait::async_trait;
use notification_service::{
    clients::{
        DeliveryChannel,
        database::NotificationStore,
        kafka::{MessageSource, SourceMessage},
    },
    handlers::{
        HandlerContext, OrderCancelledHandler, OrderCreatedHandler, PaymentFailedHandler,
        PaymentSuccessHandler,
    },
    models::notification::{Channel, CreateNotification},
    router::EventRouter,
};

pub const FALLBACK_EMAIL: &str = "customer@example.com";
pub const FALLBACK_PHONE: &str = "+10000000000";

/// Store fake that records every write, or refuses them all.
#[derive(Default)]
pub struct RecordingStore {
    records: Mutex<Vec<CreateNotification>>,
    fail_writes: bool,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(Vec::new()),
            fail_writes: true,
        })
    }

    pub fn records(&self) -> Vec<CreateNotification> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for RecordingStore {
    async fn create(&self, notification: CreateNotification) -> Result<(), Error> {
        if self.fail_writes {
            return Err(anyhow!("store unavailable"));
        }
        self.records.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Channel fake counting transport calls and capturing what was sent.
pub struct RecordingChannel {
    channel: Channel,
    fail_sends: bool,
    calls: AtomicUsize,
    sent: Mutex<Vec<(String, Option<String>, String)>>,
}

impl RecordingChannel {
    pub fn new(channel: Channel) -> Arc<Self> {
        Arc::new(Self {
            channel,
            fail_sends: false,
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(channel: Channel) -> Arc<Self> {
        Arc::new(Self {
            channel,
            fail_sends: true,
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(String, Option<String>, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(
        &self,
        recipient: &str,
        subject: Option<&str>,
        body: &str,
    ) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push((
            recipient.to_string(),
            subject.map(str::to_string),
            body.to_string(),
        ));

        if self.fail_sends {
            return Err(anyhow!("transport unavailable"));
        }
        Ok(())
    }
}

/// Scripted broker source. Fetch replays the script in order, then blocks
/// forever, which is where cancellation finds the loop.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<SourceMessage, String>>>,
    fetch_calls: AtomicUsize,
    commits: Mutex<Vec<(String, i32, i64)>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<SourceMessage, String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fetch_calls: AtomicUsize::new(0),
            commits: Mutex::new(Vec::new()),
        })
    }

    pub fn committed(&self) -> Vec<(String, i32, i64)> {
        self.commits.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn fetch(&self) -> Result<SourceMessage, Error> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(message)) => Ok(message),
            Some(Err(e)) => Err(anyhow!(e)),
            None => std::future::pending().await,
        }
    }

    async fn commit(&self, message: &SourceMessage) -> Result<(), Error> {
        self.commits.lock().unwrap().push((
            message.topic.clone(),
            message.partition,
            message.offset,
        ));
        Ok(())
    }

    fn close(&self) {}
}

pub fn message(topic: &str, offset: i64, payload: &[u8]) -> SourceMessage {
    SourceMessage {
        topic: topic.to_string(),
        key: None,
        payload: payload.to_vec(),
        partition: 0,
        offset,
    }
}

pub fn test_context(
    store: Arc<RecordingStore>,
    email: Arc<RecordingChannel>,
    sms: Arc<RecordingChannel>,
) -> Arc<HandlerContext> {
    Arc::new(HandlerContext {
        store,
        email,
        sms,
        fallback_email: FALLBACK_EMAIL.to_string(),
        fallback_phone: FALLBACK_PHONE.to_string(),
    })
}

/// Router with the four built-in handlers registered 1:1, the shape an
/// empty topic mapping produces.
pub fn test_router(context: Arc<HandlerContext>) -> EventRouter {
    let mut router = EventRouter::new();
    router.register(
        "order.created",
        Arc::new(OrderCreatedHandler::new(context.clone())),
    );
    router.register(
        "order.cancelled",
        Arc::new(OrderCancelledHandler::new(context.clone())),
    );
    router.register(
        "payment.success",
        Arc::new(PaymentSuccessHandler::new(context.clone())),
    );
    router.register(
        "payment.failed",
        Arc::new(PaymentFailedHandler::new(context)),
    );
    router
}

pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);

    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within deadline"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
