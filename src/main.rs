use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use notification_service::{
    api,
    clients::{
        DeliveryChannel,
        database::{NotificationStore, PostgresStore},
        email::EmailSender,
        kafka::{KafkaSource, MessageSource},
        sms::SmsSender,
    },
    config::Config,
    handlers::HandlerContext,
    router::EventRouter,
    worker::ConsumerLoop,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting notification service worker");

    let config = Config::load().await?;

    let store: Arc<dyn NotificationStore> = Arc::new(PostgresStore::connect(&config.database).await?);
    let email: Arc<dyn DeliveryChannel> = Arc::new(EmailSender::new(&config)?);
    let sms: Arc<dyn DeliveryChannel> = Arc::new(SmsSender::new(&config)?);

    let context = Arc::new(HandlerContext {
        store,
        email,
        sms,
        fallback_email: config.fallback_email.clone(),
        fallback_phone: config.fallback_phone.clone(),
    });

    let router = EventRouter::with_default_handlers(&config, context);
    let shutdown = CancellationToken::new();

    let server_port = config.server_port;
    tokio::spawn(async move {
        if let Err(e) = api::run_api_server(server_port).await {
            error!(error = %e, "Health server exited");
        }
    });

    // A missing broker list degrades to a process that only serves the
    // health endpoint; a client that cannot be constructed is fatal.
    let consumer = if config.kafka.brokers.is_empty() {
        warn!("No Kafka brokers configured, skipping consumer");
        None
    } else {
        let source: Arc<dyn MessageSource> = Arc::new(KafkaSource::connect(&config.kafka)?);
        let consumer_loop = ConsumerLoop::new(source, router, shutdown.clone());
        Some(tokio::spawn(consumer_loop.run()))
    };

    shutdown_signal().await;
    info!("Shutting down worker");
    shutdown.cancel();

    if let Some(handle) = consumer {
        handle
            .await
            .map_err(|e| anyhow!("Consumer task failed: {}", e))?;
    }

    info!("Worker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
