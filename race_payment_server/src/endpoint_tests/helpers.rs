use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use race_payment_engine::{
    db_types::{NewCompetition, NewParticipationGroup, NewRegistration, PaymentStatus, Registration, RegistrationId, Won},
    events::EventProducers,
    reconciliation_objects::BankAccount,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::RegistrationDatabase,
    ReconciliationApi,
    SqliteDatabase,
};
use serde_json::Value;

use crate::server::{bank_scope, WebhookGuard};

pub const ACCOUNT_NO: &str = "123-456-789012";
pub const BANK_NAME: &str = "국민은행";

pub fn bank_account() -> BankAccount {
    BankAccount::new(ACCOUNT_NO, BANK_NAME)
}

/// Sends `req` to a `/bank` scope backed by `api`, and returns the status and JSON body.
pub async fn send_request<B: RegistrationDatabase + 'static>(
    api: ReconciliationApi<B>,
    guard: WebhookGuard,
    req: TestRequest,
) -> (StatusCode, Value) {
    let app = App::new().app_data(web::Data::new(api)).service(bank_scope::<B>(guard));
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get_orders<B: RegistrationDatabase + 'static>(api: ReconciliationApi<B>) -> (StatusCode, Value) {
    send_request(api, WebhookGuard::default(), TestRequest::get().uri("/bank/orders")).await
}

pub async fn post_json<B: RegistrationDatabase + 'static>(
    api: ReconciliationApi<B>,
    path: &str,
    body: &str,
) -> (StatusCode, Value) {
    let req = TestRequest::post().uri(path).insert_header(("content-type", "application/json")).set_payload(body.to_string());
    send_request(api, WebhookGuard::default(), req).await
}

pub fn reconciliation_api(db: SqliteDatabase) -> ReconciliationApi<SqliteDatabase> {
    ReconciliationApi::new(db, EventProducers::default(), bank_account())
}

pub fn race_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 5, 23, 0, 0).unwrap()
}

/// A migrated database holding one competition with a 10K group, and pending registrations `R1` (김철수, paid by
/// 김영희) and `R2` (이민수), with `R2` the newer of the two.
pub async fn seeded_database() -> SqliteDatabase {
    let db = prepare_test_env(&random_db_path()).await;
    let competition = db
        .insert_competition(NewCompetition::new("서울 봄 마라톤", race_day(), "여의도 공원"))
        .await
        .expect("Error inserting competition");
    let group = db
        .insert_participation_group(
            NewParticipationGroup::new(competition.id, "10K", Won::from(30_000)).with_distance("10km"),
        )
        .await
        .expect("Error inserting group");
    let r1 = NewRegistration::new(competition.id, "김철수", "010-1234-5678")
        .with_id("R1")
        .with_group(group.id)
        .with_depositor("김영희")
        .with_created_at(Utc.with_ymd_and_hms(2025, 3, 1, 1, 2, 3).unwrap());
    let r2 = NewRegistration::new(competition.id, "이민수", "010-9876-5432")
        .with_id("R2")
        .with_group(group.id)
        .with_created_at(Utc.with_ymd_and_hms(2025, 3, 2, 9, 30, 0).unwrap());
    db.insert_registration(r1).await.expect("Error inserting R1");
    db.insert_registration(r2).await.expect("Error inserting R2");
    db
}

pub fn pending_registration(id: &str) -> Registration {
    let now = Utc::now();
    Registration {
        id: RegistrationId::from(id),
        competition_id: 1,
        participation_group_id: Some(1),
        user_id: None,
        name: "김철수".into(),
        phone: "010-1234-5678".into(),
        email: None,
        depositor_name: "김철수".into(),
        distance: None,
        entry_fee: Won::from(30_000),
        payment_status: PaymentStatus::Pending,
        guest_password_hash: None,
        created_at: now,
        updated_at: now,
    }
}
