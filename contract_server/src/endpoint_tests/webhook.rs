use actix_web::{http::StatusCode, web, web::ServiceConfig};
use contract_engine::{db_types::ReconciliationOutcome, ContractFlowApi};
use csg_common::Secret;

use super::{
    helpers::{post_form, post_json, send_request},
    mocks::{pending_contract, MockContractDb, MockGateway},
};
use crate::{config::WebhookAuthConfig, webhook::ContractWebhookRoute};

fn register(cfg: &mut ServiceConfig, db: MockContractDb, auth: WebhookAuthConfig) {
    let api = ContractFlowApi::new(db, MockGateway::new());
    cfg.app_data(web::Data::new(api))
        .app_data(web::Data::new(auth))
        .service(ContractWebhookRoute::<MockContractDb, MockGateway>::new());
}

/// The mock asserts that the JSON body was normalized into the expected event fields.
fn db_expecting_submission_77() -> MockContractDb {
    let mut db = MockContractDb::new();
    db.expect_reconcile_event()
        .withf(|event| {
            event.envelope_id.as_deref() == Some("77")
                && event.participant_email.as_deref() == Some("sally@sellers.test")
                && event.status.as_deref() == Some("completed")
        })
        .returning(|_| Ok(ReconciliationOutcome::Updated(Box::new(pending_contract()))));
    db
}

#[actix_web::test]
async fn json_webhook_is_normalized_and_acknowledged() {
    let _ = env_logger::try_init();
    let body = r#"{
        "event_type": "form.completed",
        "data": { "submission_id": 77, "email": "sally@sellers.test", "status": "completed" }
    }"#;
    let (status, body) = post_json("/webhook", body, &[], configure_matching).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"), "unexpected body: {body}");
    assert!(body.contains("ok"), "unexpected body: {body}");
}

fn configure_matching(cfg: &mut ServiceConfig) {
    register(cfg, db_expecting_submission_77(), WebhookAuthConfig::default());
}

#[actix_web::test]
async fn form_payload_field_is_unwrapped() {
    let _ = env_logger::try_init();
    let body = "payload=%7B%22data%22%3A%7B%22submission_id%22%3A77%2C%22email%22%3A%22sally%40sellers.test%22%2C%22status%22%3A%22completed%22%7D%7D";
    let (status, body) = post_form("/webhook", body, &[], configure_matching).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok"), "unexpected body: {body}");
}

#[actix_web::test]
async fn flat_form_fields_are_accepted() {
    let _ = env_logger::try_init();
    let body = "submission_id=77&email=sally%40sellers.test&status=completed";
    let (status, body) = post_form("/webhook", body, &[], configure_matching).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok"), "unexpected body: {body}");
}

#[actix_web::test]
async fn unmatched_events_still_get_a_200() {
    let _ = env_logger::try_init();
    let body = r#"{"envelope_id": "nobody-knows-this", "status": "completed"}"#;
    let (status, body) = post_json("/webhook", body, &[], configure_no_match).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ignored"), "unexpected body: {body}");
}

fn configure_no_match(cfg: &mut ServiceConfig) {
    let mut db = MockContractDb::new();
    db.expect_reconcile_event().returning(|_| Ok(ReconciliationOutcome::NoMatch));
    register(cfg, db, WebhookAuthConfig::default());
}

#[actix_web::test]
async fn unparseable_bodies_still_get_a_200() {
    let _ = env_logger::try_init();
    let (status, body) = post_json("/webhook", "this is not json", &[], configure_never_reconciles).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":false"), "unexpected body: {body}");
}

/// Events without any locator must be dropped before they reach storage.
#[actix_web::test]
async fn events_without_locators_never_reach_the_database() {
    let _ = env_logger::try_init();
    let body = r#"{"event_type": "form.viewed"}"#;
    let (status, body) = post_json("/webhook", body, &[], configure_never_reconciles).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ignored"), "unexpected body: {body}");
}

fn configure_never_reconciles(cfg: &mut ServiceConfig) {
    let mut db = MockContractDb::new();
    db.expect_reconcile_event().never();
    register(cfg, db, WebhookAuthConfig::default());
}

#[actix_web::test]
async fn shared_secret_is_enforced_when_configured() {
    let _ = env_logger::try_init();
    let body = r#"{"submission_id": 77, "email": "sally@sellers.test", "status": "completed"}"#;
    let (status, _) = post_json("/webhook", body, &[], configure_with_secret).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) =
        post_json("/webhook", body, &[("x-webhook-secret", "wrong")], configure_with_secret).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) =
        post_json("/webhook", body, &[("x-webhook-secret", "hunter2")], configure_with_secret).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok"), "unexpected body: {body}");
}

fn configure_with_secret(cfg: &mut ServiceConfig) {
    let auth = WebhookAuthConfig {
        header_name: "x-webhook-secret".to_string(),
        secret: Secret::new("hunter2".to_string()),
    };
    register(cfg, db_expecting_submission_77(), auth);
}

#[actix_web::test]
async fn missing_content_type_defaults_to_json() {
    let _ = env_logger::try_init();
    let body = r#"{"submission_id": 77, "email": "sally@sellers.test", "status": "completed"}"#;
    let (status, response) = send_request(Some((body, "text/plain")), "/webhook", &[], configure_matching).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.contains("ok"), "unexpected body: {response}");
}
