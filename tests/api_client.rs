//! HTTP-level behavior of the API session against a mock server.

mod common;

use std::time::Duration;

use common::config_for;
use hme_cli::api::{ApiClient, ApiError, HideMyEmailApi};
use hme_cli::credentials::Credentials;
use hme_cli::envelope::{Envelope, ErrorRepr};
use hme_cli::listing::{list_aliases, ListFilter, ListOutcome};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(config_for(&server.uri()), Credentials::new("X-APPLE-WEBAUTH=abc"))
}

#[tokio::test]
async fn generate_sends_fixed_query_and_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/hme/generate"))
        .and(query_param("clientBuildNumber", "2206Hotfix11"))
        .and(query_param("clientMasteringNumber", "2206Hotfix11"))
        .and(query_param("clientId", ""))
        .and(query_param("dsid", ""))
        .and(header("cookie", "X-APPLE-WEBAUTH=abc"))
        .and(header("origin", "https://www.icloud.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "result": {"hme": "a@icloud.com"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let session = client.open_session().unwrap();
    let envelope = session.generate_email().await.unwrap();

    assert!(envelope.success);
    assert_eq!(envelope.result, Some(json!({"hme": "a@icloud.com"})));
}

#[tokio::test]
async fn reserve_posts_address_label_and_note() {
    let server = MockServer::start().await;
    let config = config_for(&server.uri()).with_label("shopping");
    let note = config.note.clone();
    Mock::given(method("POST"))
        .and(path("/v1/hme/reserve"))
        .and(header("content-type", "text/plain"))
        .and(body_json(json!({"hme": "a@icloud.com", "label": "shopping", "note": note})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "result": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(config, Credentials::default());
    let session = client.open_session().unwrap();
    let envelope = session.reserve_email("a@icloud.com").await.unwrap();

    assert!(envelope.success);
}

#[tokio::test]
async fn remote_failure_is_returned_as_an_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/hme/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"errorCode": "-41015", "errorMessage": "You have reached the limit"}
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let session = client.open_session().unwrap();
    let envelope = session.generate_email().await.unwrap();

    assert!(!envelope.success);
    assert!(matches!(envelope.error, Some(ErrorRepr::Detailed { .. })));
    assert_eq!(envelope.failure_reason(), "You have reached the limit");
}

#[tokio::test]
async fn slow_response_becomes_timeout_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/hme/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "result": {"hme": "late@icloud.com"}}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let session = client.open_session().unwrap();
    let envelope = session.generate_email().await.unwrap();

    assert_eq!(envelope, Envelope::timed_out());
    assert_eq!(envelope.failure_reason(), "Request timed out");
}

#[tokio::test]
async fn non_json_body_is_a_hard_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/hme/list"))
        .respond_with(ResponseTemplate::new(401).set_body_string("<html>Unauthorized</html>"))
        .mount(&server)
        .await;

    let client = client(&server);
    let session = client.open_session().unwrap();
    let err = session.list_email().await.unwrap_err();

    match err {
        ApiError::Transport(e) => assert!(e.is_decode()),
        other => panic!("expected decode failure, got {other:?}"),
    }
}

#[tokio::test]
async fn listing_filters_live_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/hme/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {
                "forwardToEmails": ["me@example.com"],
                "hmeEmails": [
                    {"label": "work laptop", "hme": "a@icloud.com", "createTimestamp": 1650000000000i64, "isActive": true},
                    {"label": "work phone", "hme": "b@icloud.com", "createTimestamp": 1650000001000i64, "isActive": false},
                    {"label": "games", "hme": "c@icloud.com", "createTimestamp": 1650000002000i64, "isActive": true},
                    {"label": "network", "hme": "d@icloud.com", "createTimestamp": 1650000003000i64, "isActive": true}
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let session = client.open_session().unwrap();
    let filter = ListFilter::new(true, Some("work")).unwrap();

    let ListOutcome::Listed(rows) = list_aliases(&session, &filter).await.unwrap() else {
        panic!("listing should succeed");
    };
    let addresses: Vec<_> = rows.iter().map(|r| r.hme.as_str()).collect();
    assert_eq!(addresses, ["a@icloud.com", "d@icloud.com"]);
}

#[tokio::test]
async fn listing_failure_reports_the_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/hme/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "error": 1, "reason": "Missing session"})),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    let session = client.open_session().unwrap();
    let filter = ListFilter::new(true, None).unwrap();

    assert_eq!(
        list_aliases(&session, &filter).await.unwrap(),
        ListOutcome::Failed("Missing session".into())
    );
}
