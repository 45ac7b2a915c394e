// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook notifier against a mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use leadflow_config::model::NotifyConfig;
use leadflow_core::{EnrichedLead, LeadflowError, LookupStatus, Notifier, NotifyReceipt};
use leadflow_notify::{StaticSecretResolver, WebhookNotifier, WebhookTarget};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lead() -> EnrichedLead {
    EnrichedLead {
        lead_id: "L1".into(),
        display_name: Some("Jane Doe".into()),
        status_label: Some("Qualified".into()),
        date_created: Some("2024-03-01".into()),
        lead_email: Some("a@x.com".into()),
        lead_owner: Some("alice".into()),
        funnel: None,
        assignee: Some("alice".into()),
        enriched_at: "2024-03-01T10:00:00+00:00".into(),
        owner_lookup_status: LookupStatus::Ok,
    }
}

fn resolver_with(name: &str, value: String) -> Arc<StaticSecretResolver> {
    Arc::new(StaticSecretResolver::new().with_secret(name, value))
}

#[tokio::test]
async fn posts_summary_to_direct_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({"text": "New Lead Alert"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let config = NotifyConfig {
        webhook_url: Some(format!("{}/hook", server.uri())),
        ..NotifyConfig::default()
    };
    let notifier = WebhookNotifier::from_config(&config, Arc::new(StaticSecretResolver::new()))
        .expect("notifier");
    let receipt = notifier.notify(&lead()).await.expect("delivered");
    assert_eq!(receipt, NotifyReceipt::Delivered { status: 200 });
}

#[tokio::test]
async fn resolves_url_from_json_secret_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let secret = json!({"webhook": format!("{}/hook", server.uri())}).to_string();
    let config = NotifyConfig {
        secret_name: Some("slack/webhook".into()),
        ..NotifyConfig::default()
    };
    let notifier =
        WebhookNotifier::from_config(&config, resolver_with("slack/webhook", secret)).expect("notifier");

    notifier.notify(&lead()).await.expect("first");
    notifier.notify(&lead()).await.expect("second");
    assert!(matches!(notifier.target(), WebhookTarget::Secret { cache, .. } if cache.initialized()));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let target = WebhookTarget::from_parts(
        Some(&format!("{}/hook", server.uri())),
        None,
        Arc::new(StaticSecretResolver::new()),
    );
    let notifier = WebhookNotifier::new(target, Duration::from_secs(5)).expect("notifier");
    let err = notifier.notify(&lead()).await.expect_err("500");
    match err {
        LeadflowError::Notify { message, .. } => {
            assert!(message.contains("500"), "{message}");
            assert!(message.contains("boom"), "{message}");
        }
        other => panic!("expected Notify, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_secret_is_an_error() {
    let config = NotifyConfig {
        secret_name: Some("missing".into()),
        ..NotifyConfig::default()
    };
    let notifier = WebhookNotifier::from_config(&config, Arc::new(StaticSecretResolver::new()))
        .expect("notifier");
    let err = notifier.notify(&lead()).await.expect_err("no secret");
    assert!(matches!(err, LeadflowError::Secret { .. }));
}

#[tokio::test]
async fn disabled_target_is_a_no_op() {
    let notifier = WebhookNotifier::from_config(
        &NotifyConfig::default(),
        Arc::new(StaticSecretResolver::new()),
    )
    .expect("notifier");
    let receipt = notifier.notify(&lead()).await.expect("no-op");
    assert_eq!(receipt, NotifyReceipt::Disabled);
}

#[tokio::test]
async fn slow_webhook_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let target = WebhookTarget::from_parts(
        Some(&server.uri()),
        None,
        Arc::new(StaticSecretResolver::new()),
    );
    let notifier = WebhookNotifier::new(target, Duration::from_millis(100)).expect("notifier");
    let err = notifier.notify(&lead()).await.expect_err("timeout");
    assert!(matches!(err, LeadflowError::Notify { .. }));
}
