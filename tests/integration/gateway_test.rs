//! Profile gateway sink tests against a mock gateway

use crate::common::*;
use assert_matches::assert_matches;
use serde_json::json;
use std::time::Duration;
use tracksync::backend::clients::{GatewayProfileSink, ProfileSink, SinkError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_reads_profile_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "last_name": "Smith" })))
        .mount(&server)
        .await;
    let sink = assert_ok!(GatewayProfileSink::new(gateway_config(&server)));

    assert_eq!(assert_ok!(sink.profile_name().await), "Smith");
}

#[tokio::test]
async fn test_writes_profile_name() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer session-token"))
        .and(body_json(json!({ "last_name": "| Taylor Swift - Anti-Hero" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let sink = assert_ok!(GatewayProfileSink::new(gateway_config(&server)));

    assert_ok!(sink.set_profile_name("| Taylor Swift - Anti-Hero").await);
}

#[tokio::test]
async fn test_429_is_rate_limited_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;
    let sink = assert_ok!(GatewayProfileSink::new(gateway_config(&server)));

    assert_eq!(
        sink.set_profile_name("x").await,
        Err(SinkError::RateLimited { retry_after: Some(30) })
    );
}

#[tokio::test]
async fn test_flood_wait_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(420).set_body_string("FLOOD_WAIT_120"))
        .mount(&server)
        .await;
    let sink = assert_ok!(GatewayProfileSink::new(gateway_config(&server)));

    assert_eq!(
        sink.set_profile_name("x").await,
        Err(SinkError::RateLimited { retry_after: Some(120) })
    );
}

#[tokio::test]
async fn test_expired_session_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_string("AUTH_KEY_UNREGISTERED"))
        .mount(&server)
        .await;
    let sink = assert_ok!(GatewayProfileSink::new(gateway_config(&server)));

    assert_matches!(sink.set_profile_name("x").await, Err(SinkError::Fatal(_)));
}

#[tokio::test]
async fn test_slow_gateway_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let mut config = gateway_config(&server);
    config.timeout = Duration::from_millis(200);
    let sink = assert_ok!(GatewayProfileSink::new(config));

    assert_matches!(sink.set_profile_name("x").await, Err(SinkError::Transient(_)));
}
