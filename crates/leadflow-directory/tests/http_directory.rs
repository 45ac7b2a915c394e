// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner directory client against a mock HTTP server.

use std::time::Duration;

use leadflow_core::{ErrorClass, LookupError, OwnerDirectory, OwnerRecord, classify};
use leadflow_directory::{HttpOwnerDirectory, RetryPolicy, RetryingDirectory};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, timeout: Duration) -> HttpOwnerDirectory {
    HttpOwnerDirectory::new(&format!("{}/owners", server.uri()), timeout).expect("client")
}

fn fast_policy(retry_transient: u32) -> RetryPolicy {
    RetryPolicy {
        retry_transient,
        backoff_base: Duration::from_millis(1),
        backoff_jitter: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn successful_lookup_maps_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/owners/L1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lead_owner": "alice",
            "lead_email": "a@x.com",
            "funnel": "inbound",
            "extra": {"ignored": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = client(&server, Duration::from_secs(5))
        .lookup("L1")
        .await
        .expect("lookup should succeed");
    assert_eq!(
        record,
        OwnerRecord {
            owner: Some("alice".into()),
            email: Some("a@x.com".into()),
            funnel: Some("inbound".into()),
        }
    );
}

#[tokio::test]
async fn partial_body_leaves_fields_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/owners/L2.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"lead_owner": "bob"})))
        .mount(&server)
        .await;

    let record = client(&server, Duration::from_secs(5))
        .lookup("L2")
        .await
        .expect("lookup should succeed");
    assert_eq!(record.owner, Some(json!("bob")));
    assert_eq!(record.email, None);
    assert_eq!(record.funnel, None);
}

#[tokio::test]
async fn not_found_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such lead"))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .lookup("missing")
        .await
        .expect_err("404");
    match &err {
        LookupError::Status { status, body } => {
            assert_eq!(*status, 404);
            assert_eq!(body, "no such lead");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(classify(&err), ErrorClass::Permanent);
    assert_eq!(err.kind(), "HttpStatus");
}

#[tokio::test]
async fn forbidden_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .lookup("L1")
        .await
        .expect_err("403");
    assert_eq!(classify(&err), ErrorClass::Permanent);
}

#[tokio::test]
async fn server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .lookup("L1")
        .await
        .expect_err("500");
    assert_eq!(classify(&err), ErrorClass::Transient);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"lead_owner": "alice"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_millis(100))
        .lookup("L1")
        .await
        .expect_err("timeout");
    assert!(matches!(err, LookupError::Timeout { .. }), "got {err:?}");
    assert_eq!(classify(&err), ErrorClass::Transient);
}

#[tokio::test]
async fn malformed_body_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .lookup("L1")
        .await
        .expect_err("decode");
    assert!(matches!(err, LookupError::Decode { .. }));
    assert_eq!(classify(&err), ErrorClass::Unknown);
}

#[tokio::test]
async fn refused_connection_is_transient() {
    // Bind then drop a server so the port is very likely closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let dir = HttpOwnerDirectory::new(&uri, Duration::from_secs(2)).expect("client");
    let err = dir.lookup("L1").await.expect_err("refused");
    assert_eq!(classify(&err), ErrorClass::Transient, "got {err:?}");
}

#[tokio::test]
async fn retrying_client_recovers_from_one_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/owners/L1.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/owners/L1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"lead_owner": "alice"})))
        .mount(&server)
        .await;

    let dir = RetryingDirectory::new(client(&server, Duration::from_secs(5)), fast_policy(2));
    let record = dir.lookup("L1").await.expect("retry should succeed");
    assert_eq!(record.owner, Some(json!("alice")));
}

#[tokio::test]
async fn retrying_client_makes_budget_plus_one_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let dir = RetryingDirectory::new(client(&server, Duration::from_secs(5)), fast_policy(2));
    let err = dir.lookup("L1").await.expect_err("exhausted");
    assert!(matches!(err, LookupError::Status { status: 500, .. }));
}

#[tokio::test]
async fn retrying_client_stops_on_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = RetryingDirectory::new(client(&server, Duration::from_secs(5)), fast_policy(2));
    dir.lookup("L1").await.expect_err("404");
}
