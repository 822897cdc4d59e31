//! Tests for the HTTP client module

use super::*;
use crate::auth::{Credentials, StaticToken, TokenCache, TokenProvider};
use crate::error::Error;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FETCH: &str = r#"<fetch page="1" count="10"><entity name="audit"/></fetch>"#;

fn static_client() -> WebApiClient {
    let tokens: Arc<dyn TokenProvider> = Arc::new(StaticToken("test-token".to_string()));
    WebApiClient::new(tokens).unwrap()
}

fn audits_url(server: &MockServer) -> Url {
    crate::query::query_url(&server.uri(), "v9.1", "audits", FETCH).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert!(config.timeout.is_none());
    assert!(config.user_agent.starts_with("dynamics-audit/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(60))
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_api_error_envelope_defaults_code() {
    let envelope = ApiErrorEnvelope::parse(br#"{"error":{"message":"boom"}}"#).unwrap();
    let err = envelope.into_error(400);
    assert!(matches!(
        err,
        Error::Api { status: 400, ref code, message: Some(ref m) } if code == DEFAULT_ERROR_CODE && m == "boom"
    ));

    assert!(ApiErrorEnvelope::parse(b"not json").is_none());
    assert!(ApiErrorEnvelope::parse(br#"{"message":"no envelope"}"#).is_none());
}

#[tokio::test]
async fn test_request_sends_bearer_and_accept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.1/audits"))
        .and(query_param("fetchXml", FETCH))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = static_client();
    let url = audits_url(&mock_server);
    let page = client.request(&url).await.unwrap();

    assert_eq!(page.status(), 200);
    assert_eq!(page.request_url(), &url);
    assert!(!page.is_parsed());
}

#[tokio::test]
async fn test_bad_request_with_envelope_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.1/audits"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "0x0", "message": "Invalid object provided in the request."}
        })))
        .mount(&mock_server)
        .await;

    let err = static_client()
        .request(&audits_url(&mock_server))
        .await
        .unwrap_err();

    match err {
        Error::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 400);
            assert_eq!(code, "0x0");
            assert_eq!(
                message.as_deref(),
                Some("Invalid object provided in the request.")
            );
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_request_with_vendor_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "0x80040217", "message": null}
        })))
        .mount(&mock_server)
        .await;

    let err = static_client()
        .request(&audits_url(&mock_server))
        .await
        .unwrap_err();
    assert!(err.is_api());
    assert!(err.to_string().contains("error code 0x80040217"));
}

#[tokio::test]
async fn test_bad_request_unparsable_body_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("<html>Bad Request</html>"))
        .mount(&mock_server)
        .await;

    let err = static_client()
        .request(&audits_url(&mock_server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_bad_request_empty_body_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    let err = static_client()
        .request(&audits_url(&mock_server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn test_other_statuses_propagate_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": "0x1", "message": "ignored for non-400"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = static_client()
        .request(&audits_url(&mock_server))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_token_cache_exchanges_once_for_many_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/contoso/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_on": Utc::now().timestamp() + 3600,
            "access_token": "live-token"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.1/audits"))
        .and(header("Authorization", "Bearer live-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let credentials = Credentials::new("contoso", Uuid::new_v4(), "secret")
        .with_resource(mock_server.uri());
    let authority = mock_server.uri();
    let client = WebApiClient::with_token_cache(HttpClientConfig::default(), |http| {
        TokenCache::with_client(credentials, http).with_authority(authority)
    })
    .unwrap();

    let url = audits_url(&mock_server);
    client.request(&url).await.unwrap();
    client.request(&url).await.unwrap();
}

#[tokio::test]
async fn test_auth_failure_stops_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/contoso/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("AADSTS7000215"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let authority = mock_server.uri();
    let client = WebApiClient::with_token_cache(HttpClientConfig::default(), |http| {
        TokenCache::with_client(Credentials::new("contoso", Uuid::new_v4(), "bad"), http)
            .with_authority(authority)
    })
    .unwrap();

    let err = client.request(&audits_url(&mock_server)).await.unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
}

#[tokio::test]
async fn test_cancelled_client_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    let client = static_client().with_cancellation(token.clone());
    token.cancel();

    let err = client.request(&audits_url(&mock_server)).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(client.cancellation().is_cancelled());
}

#[tokio::test]
async fn test_cancel_during_slow_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"value": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    let client = static_client().with_cancellation(token.clone());
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client.request(&audits_url(&mock_server)).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}
