//! Mock-API tests for the single-probe adapters: Mistral, AI21, OpenRouter,
//! ElevenLabs, MakerSuite, DeepSeek, and xAI.

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keywarden::types::{ApiKey, KeyDetails, Provider, ValidationOptions};
use keywarden::validators::{
    Ai21Validator, DeepSeekValidator, ElevenLabsValidator, KeyValidator, MakerSuiteValidator,
    MistralValidator, OpenRouterValidator, XaiValidator,
};

fn options() -> ValidationOptions {
    ValidationOptions::default()
}

#[tokio::test]
async fn mistral_subscription_follows_model_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer mistral-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "mistral-large-latest" }]
        })))
        .mount(&server)
        .await;

    let validator = MistralValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(
            ApiKey::new(Provider::Mistral, "mistral-key"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    match result.key_info.expect("key info").details {
        KeyDetails::Mistral(details) => assert!(details.subbed),
        other => panic!("unexpected details: {other:?}"),
    }
}

#[tokio::test]
async fn mistral_rejection_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let validator = MistralValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(
            ApiKey::new(Provider::Mistral, "bad"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .expect("adapter call");

    assert!(!result.is_valid);
    assert_eq!(result.error_message.as_deref(), Some("Invalid Mistral key"));
}

#[tokio::test]
async fn ai21_reads_trial_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "trial_elapsed": true })))
        .mount(&server)
        .await;

    let validator = Ai21Validator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(
            ApiKey::new(Provider::Ai21, "ai21-key"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    match result.key_info.expect("key info").details {
        KeyDetails::Ai21(details) => assert!(details.trial_elapsed),
        other => panic!("unexpected details: {other:?}"),
    }
}

#[tokio::test]
async fn openrouter_computes_balance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "usage": 2.5,
                "limit": 10.0,
                "rate_limit": { "requests": 60 },
                "is_free_tier": false
            }
        })))
        .mount(&server)
        .await;

    let validator = OpenRouterValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(
            ApiKey::new(Provider::OpenRouter, "or-key"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    match result.key_info.expect("key info").details {
        KeyDetails::OpenRouter(details) => {
            assert_eq!(details.usage, 2.5);
            assert_eq!(details.credit_limit, 10.0);
            assert_eq!(details.balance, 7.5);
            assert_eq!(details.rpm, 60);
            assert!(!details.limit_reached);
            assert!(details.bought_credits);
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[tokio::test]
async fn elevenlabs_reads_subscription() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/subscription"))
        .and(header("xi-api-key", "el-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tier": "creator",
            "character_count": 1234,
            "character_limit": 20_000_000,
            "professional_voice_limit": 3
        })))
        .mount(&server)
        .await;

    let validator = ElevenLabsValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(
            ApiKey::new(Provider::ElevenLabs, "el-key"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    match result.key_info.expect("key info").details {
        KeyDetails::ElevenLabs(details) => {
            assert_eq!(details.tier.as_deref(), Some("creator"));
            assert_eq!(details.characters_left, 1234);
            assert!(details.unlimited);
            assert_eq!(details.pro_voice_limit, 3);
            assert_eq!(details.usage.as_deref(), Some("1234 characters remaining"));
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[tokio::test]
async fn makersuite_billing_heuristic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("key", "ms-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-quota-user", "projects/demo")
                .set_body_json(json!({
                    "models": [
                        { "name": "models/gemini-pro" },
                        { "name": "models/gemini-flash" },
                        { "name": "models/embedding-001" },
                        { "name": "models/aqa" }
                    ]
                })),
        )
        .mount(&server)
        .await;

    let validator = MakerSuiteValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(
            ApiKey::new(Provider::MakerSuite, "ms-key"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    match result.key_info.expect("key info").details {
        KeyDetails::MakerSuite(details) => {
            assert_eq!(details.models.len(), 4);
            assert_eq!(details.tier.as_deref(), Some("Standard"));
            assert!(details.enabled_billing);
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[tokio::test]
async fn deepseek_formats_balance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balance_infos": [{ "currency": "USD", "total_balance": "12.34" }]
        })))
        .mount(&server)
        .await;

    let validator = DeepSeekValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(
            ApiKey::new(Provider::DeepSeek, "ds-key"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    match result.key_info.expect("key info").details {
        KeyDetails::DeepSeek(details) => {
            assert_eq!(details.balance.as_deref(), Some("$12.34 USD"));
            assert!(details.available);
            assert!(!details.rate_limited);
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[tokio::test]
async fn deepseek_retries_then_reports_exhaustion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/balance"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let validator = DeepSeekValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(
            ApiKey::new(Provider::DeepSeek, "throttled"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .expect("adapter call");

    assert!(!result.is_valid);
    assert_eq!(
        result.error_message.as_deref(),
        Some("DeepSeek rate limited after retries")
    );
}

#[tokio::test]
async fn xai_reports_block_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_key_blocked": false,
            "api_key_disabled": false,
            "team_blocked": false
        })))
        .mount(&server)
        .await;

    let validator = XaiValidator::new(reqwest::Client::new()).with_base_url(server.uri());
    let result = validator
        .validate_key(
            ApiKey::new(Provider::Xai, "xai-key"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .expect("adapter call");

    assert!(result.is_valid);
    match result.key_info.expect("key info").details {
        KeyDetails::Xai(details) => assert!(!details.blocked),
        other => panic!("unexpected details: {other:?}"),
    }
}
