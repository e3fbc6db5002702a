use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;
use tracing::{info, warn};

use crate::clients::config_service::ConfigServiceClient;

pub const SERVICE_NAME: &str = "notification-service";

/// Logical event names consumed when the remote config supplies no topic
/// mapping; each maps 1:1 onto its physical topic.
pub const DEFAULT_TOPICS: [&str; 4] = [
    "order.created",
    "order.cancelled",
    "payment.success",
    "payment.failed",
];

/// Environment-supplied settings. Everything operational (store, brokers,
/// topics, flags) comes from the config service; the environment carries
/// local transport credentials and overrides.
#[derive(Debug, Clone, Deserialize)]
struct EnvConfig {
    #[serde(default = "default_config_service_url")]
    config_service_url: String,

    kafka_brokers: Option<String>,

    #[serde(default = "default_group_id")]
    kafka_group_id: String,

    #[serde(default = "default_smtp_host")]
    smtp_host: String,

    #[serde(default = "default_smtp_port")]
    smtp_port: u16,

    #[serde(default)]
    smtp_user: String,

    #[serde(default)]
    smtp_password: String,

    #[serde(default = "default_smtp_from")]
    smtp_from: String,

    #[serde(default)]
    sms_gateway_url: String,

    #[serde(default = "default_fallback_email")]
    fallback_email: String,

    #[serde(default)]
    fallback_phone: String,

    #[serde(default = "default_server_port")]
    server_port: u16,
}

fn default_config_service_url() -> String {
    "http://127.0.0.1:50051".to_string()
}

fn default_group_id() -> String {
    "notification-service-group".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "no-reply@ecommerce.com".to_string()
}

fn default_fallback_email() -> String {
    "customer@example.com".to_string()
}

fn default_server_port() -> u16 {
    8086
}

/// The JSON blob served by the config service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub database: DatabaseConfig,
    pub kafka: RemoteKafkaConfig,

    #[serde(default)]
    pub feature_flags: HashMap<String, bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,

    #[serde(default = "default_database_name")]
    pub name: String,
}

fn default_database_name() -> String {
    "ecommerce_notifications".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteKafkaConfig {
    #[serde(default)]
    pub brokers: Vec<String>,

    #[serde(default)]
    pub topics: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub group_id: String,

    /// Logical event name -> physical topic name.
    pub topics: HashMap<String, String>,
}

impl KafkaConfig {
    /// The physical topic names the consumer subscribes to.
    pub fn physical_topics(&self) -> Vec<&str> {
        self.topics.values().map(String::as_str).collect()
    }
}

/// Fully merged configuration, built once at startup and passed by
/// reference into each component's constructor.
#[derive(Debug, Clone)]
pub struct Config {
    pub smtp: SmtpConfig,
    pub kafka: KafkaConfig,
    pub database: DatabaseConfig,
    pub feature_flags: HashMap<String, bool>,
    pub sms_gateway_url: String,
    pub fallback_email: String,
    pub fallback_phone: String,
    pub server_port: u16,
}

impl Config {
    /// Loads the environment, then blocks on the config service for the
    /// operational settings. Exhausting the fetch retries is fatal.
    pub async fn load() -> Result<Self, Error> {
        dotenv().ok();

        let env = envy::from_env::<EnvConfig>()
            .map_err(|e| anyhow!("Invalid environment configuration: {}", e))?;

        if env.smtp_password.is_empty() {
            warn!("SMTP password not set");
        }

        info!(url = %env.config_service_url, "Fetching remote configuration");
        let client = ConfigServiceClient::new(&env.config_service_url)?;
        let remote = client.fetch(SERVICE_NAME).await?;

        info!("Configuration loaded");
        Ok(Self::merge(env, remote))
    }

    fn merge(env: EnvConfig, remote: RemoteConfig) -> Self {
        // KAFKA_BROKERS in the environment beats the remote broker list.
        let brokers = match &env.kafka_brokers {
            Some(list) if !list.is_empty() => {
                list.split(',').map(|b| b.trim().to_string()).collect()
            }
            _ => remote.kafka.brokers,
        };

        let mut topics = remote.kafka.topics;
        if topics.is_empty() {
            topics = DEFAULT_TOPICS
                .iter()
                .map(|name| (name.to_string(), name.to_string()))
                .collect();
        }

        Self {
            smtp: SmtpConfig {
                host: env.smtp_host,
                port: env.smtp_port,
                user: env.smtp_user,
                password: env.smtp_password,
                from: env.smtp_from,
            },
            kafka: KafkaConfig {
                brokers,
                group_id: env.kafka_group_id,
                topics,
            },
            database: remote.database,
            feature_flags: remote.feature_flags,
            sms_gateway_url: env.sms_gateway_url,
            fallback_email: env.fallback_email,
            fallback_phone: env.fallback_phone,
            server_port: env.server_port,
        }
    }

    /// Flags absent from the map count as disabled.
    pub fn feature_enabled(&self, name: &str) -> bool {
        self.feature_flags.get(name).copied().unwrap_or(false)
    }
}
