use std::collections::HashMap;

use anyhow::Result;
use notification_service::{
    clients::{DeliveryChannel, email::EmailSender, sms::SmsSender},
    config::{Config, DatabaseConfig, KafkaConfig, SmtpConfig},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

fn test_config(flags: &[(&str, bool)], sms_gateway_url: &str) -> Config {
    Config {
        smtp: SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: String::new(),
            password: String::new(),
            from: "no-reply@ecommerce.com".to_string(),
        },
        kafka: KafkaConfig {
            brokers: Vec::new(),
            group_id: "test-group".to_string(),
            topics: HashMap::new(),
        },
        database: DatabaseConfig {
            uri: "postgres://127.0.0.1:5432".to_string(),
            name: "test".to_string(),
        },
        feature_flags: flags
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect(),
        sms_gateway_url: sms_gateway_url.to_string(),
        fallback_email: "customer@example.com".to_string(),
        fallback_phone: String::new(),
        server_port: 0,
    }
}

/// Test: a disabled SMS channel succeeds without touching the gateway.
#[tokio::test]
async fn test_disabled_sms_channel_is_noop() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&[("enable_sms", false)], &server.uri());
    let sender = SmsSender::new(&config)?;

    assert!(!sender.is_enabled());
    sender.send("+15551234567", None, "hello").await?;

    Ok(())
}

/// Test: an enabled SMS channel posts the recipient and message once.
#[tokio::test]
async fn test_enabled_sms_posts_to_gateway() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!({ "to": "+15551234567", "message": "hello" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&[("enable_sms", true)], &server.uri());
    let sender = SmsSender::new(&config)?;

    assert!(sender.is_enabled());
    sender.send("+15551234567", None, "hello").await?;

    Ok(())
}

/// Test: a gateway failure surfaces as an error with the status attached.
#[tokio::test]
async fn test_sms_gateway_failure_surfaces_error() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let config = test_config(&[("enable_sms", true)], &server.uri());
    let sender = SmsSender::new(&config)?;

    let result = sender.send("+15551234567", None, "hello").await;

    let error = result.unwrap_err().to_string();
    assert!(error.contains("500"), "unexpected error: {}", error);

    Ok(())
}

/// Test: a disabled email channel succeeds without a transport attempt,
/// even with an unreachable SMTP host configured.
#[tokio::test]
async fn test_disabled_email_channel_is_noop() -> Result<()> {
    let config = test_config(&[("enable_email", false)], "");
    let sender = EmailSender::new(&config)?;

    assert!(!sender.is_enabled());
    sender
        .send("a@x.com", Some("subject"), "<p>body</p>")
        .await?;

    Ok(())
}

/// Test: an enabled email channel surfaces transport failures with the
/// underlying cause attached.
#[tokio::test]
async fn test_email_transport_failure_surfaces_error() -> Result<()> {
    let config = test_config(&[("enable_email", true)], "");
    let sender = EmailSender::new(&config)?;

    let result = sender.send("a@x.com", Some("subject"), "<p>body</p>").await;

    assert!(result.is_err());

    Ok(())
}
