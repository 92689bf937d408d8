use actix_web::{http::StatusCode, web, web::ServiceConfig};
use contract_engine::{
    db_types::ContractStatus,
    traits::{ContractStoreError, EnvelopeHandle, SignatureGatewayError},
    ContractFlowApi,
};
use serde_json::Value;

use super::{
    helpers::{get, post_json},
    mocks::{order_summary, pending_contract, profile_for, MockContractDb, MockGateway, ORDER_ID},
};
use crate::routes::{ContractByOrderRoute, SendContractRoute};

const SEND_BODY: &str = r#"{"orderId": 42, "templateId": "12"}"#;

fn register(cfg: &mut ServiceConfig, db: MockContractDb, gateway: MockGateway) {
    let api = ContractFlowApi::new(db, gateway);
    cfg.app_data(web::Data::new(api))
        .service(SendContractRoute::<MockContractDb, MockGateway>::new())
        .service(ContractByOrderRoute::<MockContractDb, MockGateway>::new());
}

#[actix_web::test]
async fn send_without_user_header_is_unauthenticated() {
    let _ = env_logger::try_init();
    let (status, body) = post_json("/send", SEND_BODY, &[], configure_happy_path).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("x-user-id"), "unexpected body: {body}");
}

#[actix_web::test]
async fn send_contract_happy_path() {
    let _ = env_logger::try_init();
    let (status, body) = post_json("/send", SEND_BODY, &[("x-user-id", "3")], configure_happy_path).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    let contract: Value = serde_json::from_str(&body).expect("response is not json");
    assert_eq!(contract["orderId"], 42);
    assert_eq!(contract["status"], "PENDING_BOTH");
    assert_eq!(contract["envelopeId"], "env-7");
    assert_eq!(contract["sellerSigningUrl"], "https://sign.test/env-7/seller");
}

fn configure_happy_path(cfg: &mut ServiceConfig) {
    let mut db = MockContractDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(order_summary())));
    db.expect_fetch_user().returning(|id| Ok(profile_for(id)));
    db.expect_fetch_contract_by_order().returning(|_| Ok(None));
    db.expect_upsert_draft().returning(|_| {
        let mut draft = pending_contract();
        draft.envelope_id = None;
        draft.status = ContractStatus::Draft;
        Ok(draft)
    });
    db.expect_attach_envelope().returning(|_, _| Ok(pending_contract()));
    let mut gateway = MockGateway::new();
    gateway.expect_create_envelope().returning(|_, _, _, _| {
        Ok(EnvelopeHandle { envelope_id: Some("env-7".to_string()), ..Default::default() })
    });
    register(cfg, db, gateway);
}

#[actix_web::test]
async fn outsiders_get_forbidden() {
    let _ = env_logger::try_init();
    let (status, body) = post_json("/send", SEND_BODY, &[("x-user-id", "99")], configure_outsider).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "unexpected body: {body}");
}

fn configure_outsider(cfg: &mut ServiceConfig) {
    let mut db = MockContractDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(order_summary())));
    db.expect_fetch_user().returning(|_| {
        Ok(Some(contract_engine::traits::UserProfile {
            user_id: 99,
            username: "olga".to_string(),
            email: "olga@elsewhere.test".to_string(),
            display_name: None,
            role: "MEMBER".to_string(),
        }))
    });
    register(cfg, db, MockGateway::new());
}

#[actix_web::test]
async fn unknown_orders_are_not_found() {
    let _ = env_logger::try_init();
    let (status, _) = post_json("/send", SEND_BODY, &[("x-user-id", "3")], configure_no_order).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_no_order(cfg: &mut ServiceConfig) {
    let mut db = MockContractDb::new();
    db.expect_fetch_order().returning(|_| Ok(None));
    db.expect_fetch_user().returning(|id| Ok(profile_for(id)));
    register(cfg, db, MockGateway::new());
}

#[actix_web::test]
async fn provider_failures_map_to_bad_gateway() {
    let _ = env_logger::try_init();
    let (status, body) = post_json("/send", SEND_BODY, &[("x-user-id", "3")], configure_gateway_down).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY, "unexpected body: {body}");
    assert!(body.contains("error"), "unexpected body: {body}");
}

fn configure_gateway_down(cfg: &mut ServiceConfig) {
    let mut db = MockContractDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(order_summary())));
    db.expect_fetch_user().returning(|id| Ok(profile_for(id)));
    db.expect_fetch_contract_by_order().returning(|_| Ok(None));
    db.expect_upsert_draft().returning(|_| {
        let mut draft = pending_contract();
        draft.envelope_id = None;
        draft.status = ContractStatus::Draft;
        Ok(draft)
    });
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_envelope()
        .returning(|_, _, _, _| Err(SignatureGatewayError::Network("connection refused".to_string())));
    register(cfg, db, gateway);
}

#[actix_web::test]
async fn fetch_contract_for_order() {
    let _ = env_logger::try_init();
    let (status, body) = get("/order/42", &[("x-user-id", "3")], configure_fetch).await;
    assert_eq!(status, StatusCode::OK);
    let contract: Value = serde_json::from_str(&body).expect("response is not json");
    assert_eq!(contract["orderId"], ORDER_ID);
    assert_eq!(contract["sellerEmail"], "sally@sellers.test");

    let (status, _) = get("/order/555", &[("x-user-id", "3")], configure_fetch).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure_fetch(cfg: &mut ServiceConfig) {
    let mut db = MockContractDb::new();
    db.expect_fetch_contract_by_order()
        .returning(|order_id| if order_id == ORDER_ID { Ok(Some(pending_contract())) } else { Ok(None) });
    register(cfg, db, MockGateway::new());
}

#[actix_web::test]
async fn backend_failures_are_internal_errors() {
    let _ = env_logger::try_init();
    let (status, _) = get("/order/42", &[("x-user-id", "3")], configure_db_down).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

fn configure_db_down(cfg: &mut ServiceConfig) {
    let mut db = MockContractDb::new();
    db.expect_fetch_contract_by_order()
        .returning(|_| Err(ContractStoreError::DatabaseError("disk on fire".to_string())));
    register(cfg, db, MockGateway::new());
}
