use std::net::SocketAddr;

use actix_web::{http::StatusCode, test::TestRequest};
use rpg_common::Secret;
use serde_json::json;

use super::helpers::{reconciliation_api, seeded_database, send_request};
use crate::server::{WebhookGuard, API_KEY_HEADER};

fn keyed_guard() -> WebhookGuard {
    WebhookGuard { api_key: Some(Secret::new("s3cret".to_string())), ..Default::default() }
}

fn whitelist_guard() -> WebhookGuard {
    WebhookGuard { whitelist: Some(vec!["10.0.0.5".parse().unwrap()]), use_x_forwarded_for: true, ..Default::default() }
}

fn unauthorized() -> serde_json::Value {
    json!({"return_code": 401, "description": "인증 정보 오류"})
}

#[actix_web::test]
async fn missing_api_key() {
    let db = seeded_database().await;
    let (status, body) = send_request(reconciliation_api(db), keyed_guard(), TestRequest::get().uri("/bank/orders")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized());
}

#[actix_web::test]
async fn wrong_api_key() {
    let db = seeded_database().await;
    let req = TestRequest::post()
        .uri("/bank/confirm")
        .insert_header((API_KEY_HEADER, "guess"))
        .set_payload(r#"{"requests":[{"order_id":"R1"}]}"#);
    let (status, body) = send_request(reconciliation_api(db.clone()), keyed_guard(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized());
    // The confirmation never reached the engine
    let (_, body) = send_request(
        reconciliation_api(db),
        keyed_guard(),
        TestRequest::get().uri("/bank/orders").insert_header((API_KEY_HEADER, "s3cret")),
    )
    .await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn correct_api_key() {
    let db = seeded_database().await;
    let req = TestRequest::get().uri("/bank/orders").insert_header((API_KEY_HEADER, "s3cret"));
    let (status, body) = send_request(reconciliation_api(db), keyed_guard(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn whitelisted_caller() {
    let db = seeded_database().await;
    let peer: SocketAddr = "192.168.1.1:50000".parse().unwrap();
    let req = TestRequest::get().uri("/bank/orders").peer_addr(peer).insert_header(("X-Forwarded-For", "10.0.0.5"));
    let (status, _) = send_request(reconciliation_api(db), whitelist_guard(), req).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn caller_not_on_whitelist() {
    let db = seeded_database().await;
    let peer: SocketAddr = "192.168.1.1:50000".parse().unwrap();
    let req = TestRequest::get().uri("/bank/orders").peer_addr(peer);
    let (status, body) = send_request(reconciliation_api(db), whitelist_guard(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized());
}

#[actix_web::test]
async fn api_key_prefix_is_rejected() {
    let db = seeded_database().await;
    let req = TestRequest::get().uri("/bank/orders").insert_header((API_KEY_HEADER, "s3cre"));
    let (status, body) = send_request(reconciliation_api(db), keyed_guard(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized());
}
