//! Mock-API tests for the OpenAI adapter's three-step flow.

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keywarden::types::{ApiKey, KeyDetails, Provider, ValidationOptions};
use keywarden::validators::{KeyValidator, OpenAiValidator};

fn key() -> ApiKey {
    ApiKey::new(Provider::OpenAi, "sk-test")
}

#[tokio::test]
async fn full_flow_classifies_models_quota_and_orgs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "gpt-4o" },
                { "id": "gpt-4o-mini" },
                { "id": "ft:gpt-3.5-turbo:acme" },
                { "id": "secret-internal-model" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("x-ratelimit-limit-requests", "5000")
                .insert_header("x-ratelimit-limit-tokens", "2000000")
                .set_body_json(json!({
                    "error": { "type": "invalid_request_error", "message": "max tokens" }
                })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "org-abc", "is_default": true },
                { "id": "org-def", "is_default": false }
            ]
        })))
        .mount(&server)
        .await;

    let validator = OpenAiValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    let KeyDetails::OpenAi(details) = result.key_info.expect("key info").details else {
        panic!("expected openai details");
    };
    assert_eq!(details.model.as_deref(), Some("gpt-4o"));
    assert!(!details.slop);
    assert!(details.has_quota);
    assert!(details.has_special_models);
    assert!(details.extra_models);
    assert!(details.extra_model_list.contains("secret-internal-model"));
    assert!(details.missing_models.contains("gpt-5"));
    assert_eq!(details.rpm, 5000);
    assert_eq!(details.tier.as_deref(), Some("Tier 3"));
    assert_eq!(details.organizations, vec!["org-abc", "org-def"]);
    assert_eq!(details.default_org.as_deref(), Some("org-abc"));
}

#[tokio::test]
async fn forbidden_model_listing_still_validates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let validator = OpenAiValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    let KeyDetails::OpenAi(details) = result.key_info.expect("key info").details else {
        panic!("expected openai details");
    };
    assert!(!details.access_to_model_listing);
    assert_eq!(details.model.as_deref(), Some("gpt-5"));
}

#[tokio::test]
async fn terminated_accounts_are_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "type": "access_terminated", "message": "account closed" }
        })))
        .mount(&server)
        .await;

    let validator = OpenAiValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(!result.is_valid);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Unable to verify key attributes")
    );
}

#[tokio::test]
async fn rejected_model_listing_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let validator = OpenAiValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(!result.is_valid);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Unable to retrieve models - invalid key")
    );
}

#[tokio::test]
async fn insufficient_quota_is_valid_without_quota() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "gpt-4o" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "type": "insufficient_quota", "message": "quota exceeded" }
        })))
        .mount(&server)
        .await;

    let validator = OpenAiValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(key(), &ValidationOptions::default(), &CancellationToken::new())
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    let KeyDetails::OpenAi(details) = result.key_info.expect("key info").details else {
        panic!("expected openai details");
    };
    assert!(!details.has_quota);
}
