use std::{sync::Arc, time::Duration};

use actix_web::http::StatusCode;
use race_payment_engine::{
    db_types::{PaymentStatus, RegistrationId},
    events::{EventHandlers, EventHooks, PaymentConfirmedEvent},
    traits::{RegistrationDatabase, RegistrationError, RegistrationManagement},
    ReconciliationApi,
};
use serde_json::json;
use tokio::sync::Mutex;

use super::{
    helpers::{bank_account, get_orders, pending_registration, post_json, reconciliation_api, seeded_database, send_request},
    mocks::MockRegistrationStore,
};
use crate::server::WebhookGuard;

async fn status_of(api: &ReconciliationApi<race_payment_engine::SqliteDatabase>, id: &str) -> PaymentStatus {
    api.flow()
        .db()
        .fetch_registration(&RegistrationId::from(id))
        .await
        .expect("Error fetching registration")
        .expect("Registration should exist")
        .payment_status
}

#[actix_web::test]
async fn list_pending_orders() {
    let db = seeded_database().await;
    let (status, body) = get_orders(reconciliation_api(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("return_code").is_none());
    let orders = body["orders"].as_array().expect("orders should be a list");
    assert_eq!(orders.len(), 2);
    // Newest first
    assert_eq!(orders[0]["order_id"], "R2");
    assert_eq!(
        orders[1],
        json!({
            "order_id": "R1",
            "buyer_name": "김철수",
            "billing_name": "김영희",
            "bank_account_no": "123-456-789012",
            "bank_code_name": "국민은행",
            "order_price_amount": 30000,
            "order_date": "2025-03-01 10:02:03",
            "items": [{"product_name": "서울 봄 마라톤 10K"}]
        })
    );
}

#[actix_web::test]
async fn confirm_single_order() {
    let db = seeded_database().await;
    let api = reconciliation_api(db.clone());
    let (status, body) = post_json(api, "/bank/confirm", r#"{"requests":[{"order_id":"R1"}]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"return_code": 200, "description": "정상", "orders": [{"order_id": "R1", "description": "성공"}]})
    );
    let api = reconciliation_api(db.clone());
    assert_eq!(status_of(&api, "R1").await, PaymentStatus::Confirmed);
    // A second pool sees the confirmation as well
    let other = race_payment_engine::SqliteDatabase::new_with_url(db.url(), 1).await.expect("Error opening pool");
    assert_eq!(status_of(&reconciliation_api(other), "R1").await, PaymentStatus::Confirmed);
    let (_, body) = get_orders(api).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order_id"], "R2");
}

#[actix_web::test]
async fn confirm_twice() {
    let db = seeded_database().await;
    let body = r#"{"requests":[{"order_id":"R1"}]}"#;
    let (_, first) = post_json(reconciliation_api(db.clone()), "/bank/confirm", body).await;
    assert_eq!(first["return_code"], 200);
    let (status, second) = post_json(reconciliation_api(db), "/bank/confirm", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        second,
        json!({
            "return_code": 415,
            "description": "order_id 오류",
            "orders": [{"order_id": "R1", "description": "입금대기 상태가 아님 (현재: 입금확인)"}]
        })
    );
}

#[actix_web::test]
async fn confirm_unknown_order() {
    let db = seeded_database().await;
    let (status, body) = post_json(reconciliation_api(db), "/bank/confirm", r#"{"requests":[{"order_id":"NOPE"}]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["return_code"], 415);
    assert_eq!(body["orders"], json!([{"order_id": "NOPE", "description": "존재하지 않는 주문"}]));
}

#[actix_web::test]
async fn mixed_batch_confirms_what_it_can() {
    let db = seeded_database().await;
    let (_, body) = post_json(
        reconciliation_api(db.clone()),
        "/bank/confirm",
        r#"{"requests":[{"order_id":"R1"},{"order_id":"NOPE"},{"order_id":"R2"}]}"#,
    )
    .await;
    assert_eq!(body["return_code"], 415);
    assert_eq!(body["description"], "order_id 오류");
    assert_eq!(
        body["orders"],
        json!([
            {"order_id": "R1", "description": "성공"},
            {"order_id": "NOPE", "description": "존재하지 않는 주문"},
            {"order_id": "R2", "description": "성공"}
        ])
    );
    let api = reconciliation_api(db);
    assert_eq!(status_of(&api, "R1").await, PaymentStatus::Confirmed);
    assert_eq!(status_of(&api, "R2").await, PaymentStatus::Confirmed);
}

#[actix_web::test]
async fn cancelled_orders_cannot_be_confirmed() {
    let db = seeded_database().await;
    let api = reconciliation_api(db.clone());
    api.flow().cancel(&RegistrationId::from("R2")).await.expect("Error cancelling R2");
    let (_, body) = post_json(api, "/bank/confirm", r#"{"requests":[{"order_id":"R2"}]}"#).await;
    assert_eq!(body["orders"][0]["description"], "입금대기 상태가 아님 (현재: 취소)");
    assert_eq!(status_of(&reconciliation_api(db), "R2").await, PaymentStatus::Cancelled);
}

#[actix_web::test]
async fn confirm_with_put() {
    let db = seeded_database().await;
    let req = actix_web::test::TestRequest::put()
        .uri("/bank/confirm")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"requests":[{"order_id":"R2"}]}"#);
    let (status, body) = send_request(reconciliation_api(db), WebhookGuard::default(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["return_code"], 200);
}

#[actix_web::test]
async fn malformed_confirmations() {
    let db = seeded_database().await;
    let expected = json!({"return_code": 400, "description": "요청 format 오류", "orders": []});
    for body in ["", "not json", r#"{"requests":[]}"#, r#"{"requests":[{"order_id":""}]}"#, r#"{"orders":[{"order_id":"R1"}]}"#] {
        let (status, response) = post_json(reconciliation_api(db.clone()), "/bank/confirm", body).await;
        assert_eq!(status, StatusCode::OK, "body: {body}");
        assert_eq!(response, expected, "body: {body}");
    }
    // Nothing was confirmed along the way
    let (_, body) = get_orders(reconciliation_api(db)).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn order_detail() {
    let db = seeded_database().await;
    let (status, body) = post_json(reconciliation_api(db.clone()), "/bank/order", r#"{"order_id":"R1"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["order_id"], "R1");
    assert_eq!(body["order"]["billing_name"], "김영희");
    assert_eq!(body["order"]["order_price_amount"], 30000);

    let (_, body) = post_json(reconciliation_api(db.clone()), "/bank/order", r#"{"order_id":"NOPE"}"#).await;
    assert_eq!(body, json!({"return_code": 415, "description": "존재하지 않는 주문번호"}));

    let (_, body) = post_json(reconciliation_api(db), "/bank/order", r#"{"id":"R1"}"#).await;
    assert_eq!(body, json!({"return_code": 400, "description": "요청 format 오류"}));
}

#[actix_web::test]
async fn confirmed_orders_still_have_details() {
    let db = seeded_database().await;
    post_json(reconciliation_api(db.clone()), "/bank/confirm", r#"{"requests":[{"order_id":"R1"}]}"#).await;
    let (_, body) = post_json(reconciliation_api(db), "/bank/order", r#"{"order_id":"R1"}"#).await;
    assert_eq!(body["order"]["order_id"], "R1");
}

#[actix_web::test]
async fn confirmation_publishes_event() {
    let db = seeded_database().await;
    let received = Arc::new(Mutex::new(Vec::<PaymentConfirmedEvent>::new()));
    let sink = Arc::clone(&received);
    let mut hooks = EventHooks::default();
    hooks.on_payment_confirmed(move |ev| {
        let sink = Arc::clone(&sink);
        Box::pin(async move {
            sink.lock().await.push(ev);
        })
    });
    let handlers = EventHandlers::new(5, hooks);
    let api = ReconciliationApi::new(db, handlers.producers(), bank_account());
    handlers.start_handlers();

    let (_, body) = post_json(api, "/bank/confirm", r#"{"requests":[{"order_id":"R1"},{"order_id":"NOPE"}]}"#).await;
    assert_eq!(body["orders"][0]["description"], "성공");
    let mut events = vec![];
    for _ in 0..50 {
        events = received.lock().await.clone();
        if !events.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(events.len(), 1);
    let registration = &events[0].registration;
    assert_eq!(registration.id.as_str(), "R1");
    assert_eq!(registration.payment_status, PaymentStatus::Confirmed);
    assert_eq!(registration.competition_location.as_deref(), Some("여의도 공원"));
}

//----------------------------------------------   Store failures  ----------------------------------------------------

#[actix_web::test]
async fn list_failure_is_reported_as_unauthorized() {
    let mut store = MockRegistrationStore::new();
    store.expect_fetch_pending_views().returning(|| Err(RegistrationError::DatabaseError("database is locked".into())));
    let api = ReconciliationApi::new(store, Default::default(), bank_account());
    let (status, body) = get_orders(api).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"return_code": 401, "description": "인증 정보 오류", "orders": []}));
}

#[actix_web::test]
async fn update_failure_is_per_order() {
    let mut store = MockRegistrationStore::new();
    store.expect_fetch_registration().returning(|id| Ok(Some(pending_registration(id.as_str()))));
    store
        .expect_confirm_if_pending()
        .returning(|_| Err(RegistrationError::DatabaseError("disk I/O error".into())));
    let api = ReconciliationApi::new(store, Default::default(), bank_account());
    let (status, body) = post_json(api, "/bank/confirm", r#"{"requests":[{"order_id":"R1"}]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "return_code": 415,
            "description": "order_id 오류",
            "orders": [{"order_id": "R1", "description": "업데이트 실패"}]
        })
    );
}

#[actix_web::test]
async fn lookup_failure_is_reported_against_its_order() {
    let mut store = MockRegistrationStore::new();
    store.expect_fetch_registration().returning(|id| match id.as_str() {
        "B" => Err(RegistrationError::DatabaseError("database is locked".into())),
        other => Ok(Some(pending_registration(other))),
    });
    store.expect_confirm_if_pending().times(2).returning(|id| {
        let mut registration = pending_registration(id.as_str());
        registration.payment_status = PaymentStatus::Confirmed;
        Ok(Some(registration))
    });
    let api = ReconciliationApi::new(store, Default::default(), bank_account());
    let (status, body) =
        post_json(api, "/bank/confirm", r#"{"requests":[{"order_id":"A"},{"order_id":"B"},{"order_id":"C"}]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "return_code": 415,
            "description": "order_id 오류",
            "orders": [
                {"order_id": "A", "description": "성공"},
                {"order_id": "B", "description": "업데이트 실패"},
                {"order_id": "C", "description": "성공"}
            ]
        })
    );
}

#[actix_web::test]
async fn detail_failure() {
    let mut store = MockRegistrationStore::new();
    store
        .expect_fetch_reconciliation_view()
        .returning(|_| Err(RegistrationError::DatabaseError("database is locked".into())));
    let api = ReconciliationApi::new(store, Default::default(), bank_account());
    let (status, body) = post_json(api, "/bank/order", r#"{"order_id":"R1"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"return_code": 500, "description": "서버 오류"}));
}
