//! Mock-API tests for the Anthropic adapter: retry-on-throttle, refusal
//! detection, tier mapping, and quota classification.

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keywarden::types::{ApiKey, KeyDetails, Provider, ValidationOptions};
use keywarden::validators::{AnthropicValidator, KeyValidator};

fn key() -> ApiKey {
    ApiKey::new(Provider::Anthropic, "sk-ant-test")
}

#[tokio::test]
async fn throttled_probe_retries_then_succeeds() {
    let server = MockServer::start().await;

    // First attempt is throttled, the retry lands.
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("anthropic-ratelimit-requests-limit", "1000")
                .set_body_json(json!({
                    "content": [
                        { "type": "text", "text": "I can't reproduce copyrighted material." }
                    ]
                })),
        )
        .mount(&server)
        .await;

    let validator = AnthropicValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    let KeyDetails::Anthropic(details) = result.key_info.expect("key info").details else {
        panic!("expected anthropic details");
    };
    assert!(details.rate_limited);
    assert!(details.pozzed);
    assert_eq!(details.tier.as_deref(), Some("Tier 2"));
    assert_eq!(details.rpm, 1000);
}

#[tokio::test]
async fn disabled_organization_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "type": "error",
            "error": { "message": "This organization has been disabled" }
        })))
        .mount(&server)
        .await;

    let validator = AnthropicValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(!result.is_valid);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Invalid Anthropic key or organization disabled")
    );
}

#[tokio::test]
async fn exhausted_credit_is_valid_without_quota() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("anthropic-ratelimit-requests-limit", "50")
                .set_body_json(json!({
                    "type": "error",
                    "error": { "message": "Your credit balance is too low to access the API" }
                })),
        )
        .mount(&server)
        .await;

    let validator = AnthropicValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    let KeyDetails::Anthropic(details) = result.key_info.expect("key info").details else {
        panic!("expected anthropic details");
    };
    assert!(!details.has_quota);
    assert_eq!(details.tier.as_deref(), Some("Tier 1"));
}

#[tokio::test]
async fn rejected_key_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": { "message": "invalid x-api-key" }
        })))
        .mount(&server)
        .await;

    let validator = AnthropicValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(!result.is_valid);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Invalid Anthropic key or organization disabled")
    );
}

#[tokio::test]
async fn missing_rate_limit_header_marks_unknown_tier() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": "GENERATED TEXT" }]
        })))
        .mount(&server)
        .await;

    let validator = AnthropicValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    let KeyDetails::Anthropic(details) = result.key_info.expect("key info").details else {
        panic!("expected anthropic details");
    };
    assert_eq!(details.tier.as_deref(), Some("Unknown (bad header)"));
    assert!(!details.pozzed);
    assert!(!details.rate_limited);
}
