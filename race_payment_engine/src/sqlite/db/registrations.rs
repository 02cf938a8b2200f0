use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::db_types::{NewRegistration, PaymentStatus, ReconciliationView, Registration, RegistrationId, Won};

/// Registration columns joined with the competition and participation group. Both joins are outer joins since a
/// registration can outlive its group.
const VIEW_SELECT: &str = r#"
    SELECT
        r.id AS id,
        r.name AS name,
        r.phone AS phone,
        r.email AS email,
        r.depositor_name AS depositor_name,
        r.distance AS distance,
        r.entry_fee AS entry_fee,
        r.payment_status AS payment_status,
        r.created_at AS created_at,
        c.title AS competition_title,
        c.date AS competition_date,
        c.location AS competition_location,
        g.name AS group_name,
        g.distance AS group_distance
    FROM registrations r
    LEFT JOIN competitions c ON c.id = r.competition_id
    LEFT JOIN participation_groups g ON g.id = r.participation_group_id
"#;

/// Inserts the registration in the `pending` state. The entry fee and id must already be resolved by the caller.
pub async fn insert_registration(
    id: &RegistrationId,
    registration: NewRegistration,
    entry_fee: Won,
    conn: &mut SqliteConnection,
) -> Result<Registration, sqlx::Error> {
    let created_at = registration.created_at;
    let registration: Registration = sqlx::query_as(
        r#"
            INSERT INTO registrations (
                id, competition_id, participation_group_id, user_id, name, phone, email, depositor_name, distance,
                entry_fee, payment_status, guest_password_hash, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
        "#,
    )
    .bind(id.as_str())
    .bind(registration.competition_id)
    .bind(registration.participation_group_id)
    .bind(registration.user_id)
    .bind(registration.name)
    .bind(registration.phone)
    .bind(registration.email)
    .bind(registration.depositor_name)
    .bind(registration.distance)
    .bind(entry_fee)
    .bind(PaymentStatus::Pending)
    .bind(registration.guest_password_hash)
    .bind(created_at)
    .bind(created_at)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Inserted new registration: {registration:?}");
    Ok(registration)
}

pub async fn fetch_registration(
    id: &RegistrationId,
    conn: &mut SqliteConnection,
) -> Result<Option<Registration>, sqlx::Error> {
    let registration =
        sqlx::query_as("SELECT * FROM registrations WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(registration)
}

pub async fn fetch_reconciliation_view(
    id: &RegistrationId,
    conn: &mut SqliteConnection,
) -> Result<Option<ReconciliationView>, sqlx::Error> {
    let query = format!("{VIEW_SELECT} WHERE r.id = $1");
    let view = sqlx::query_as(&query).bind(id.as_str()).fetch_optional(conn).await?;
    Ok(view)
}

/// All pending registrations, newest first. Ties on the creation time are broken by id, descending.
pub async fn fetch_pending_views(conn: &mut SqliteConnection) -> Result<Vec<ReconciliationView>, sqlx::Error> {
    let query = format!("{VIEW_SELECT} WHERE r.payment_status = $1 ORDER BY r.created_at DESC, r.id DESC");
    let views = sqlx::query_as(&query).bind(PaymentStatus::Pending).fetch_all(conn).await?;
    trace!("🗃️ Fetched {} pending registrations", views.len());
    Ok(views)
}

pub async fn fetch_registrations_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Registration>, sqlx::Error> {
    let registrations =
        sqlx::query_as("SELECT * FROM registrations WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(registrations)
}

/// Guest registrations (no user id) in the competition under the given name. Password checks are left to the caller.
pub async fn fetch_guest_registrations(
    competition_id: i64,
    name: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Registration>, sqlx::Error> {
    let registrations = sqlx::query_as(
        r#"
            SELECT * FROM registrations
            WHERE competition_id = $1 AND name = $2 AND user_id IS NULL AND guest_password_hash IS NOT NULL
            ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(competition_id)
    .bind(name)
    .fetch_all(conn)
    .await?;
    Ok(registrations)
}

/// Returns the id of a live (not cancelled) registration for the member in the competition, if any.
pub async fn find_live_registration_for_user(
    competition_id: i64,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<RegistrationId>, sqlx::Error> {
    let id = sqlx::query_scalar(
        "SELECT id FROM registrations WHERE competition_id = $1 AND user_id = $2 AND payment_status <> $3 LIMIT 1",
    )
    .bind(competition_id)
    .bind(user_id)
    .bind(PaymentStatus::Cancelled)
    .fetch_optional(conn)
    .await?;
    Ok(id)
}

/// Moves a registration from `pending` to `confirmed` in a single conditional statement.
///
/// Returns `None` if no row was updated: either there is no such registration or it is no longer pending. Concurrent
/// callers racing on the same id are serialised by the database, so exactly one of them gets `Some`. Run it in a
/// transaction and commit before reporting the result.
pub async fn confirm_if_pending(
    id: &RegistrationId,
    conn: &mut SqliteConnection,
) -> Result<Option<Registration>, sqlx::Error> {
    // Step the statement to completion so that it is reset before the caller commits
    let updated: Vec<Registration> = sqlx::query_as(
        r#"
            UPDATE registrations SET payment_status = $1, updated_at = $2
            WHERE id = $3 AND payment_status = $4
            RETURNING *
        "#,
    )
    .bind(PaymentStatus::Confirmed)
    .bind(Utc::now())
    .bind(id.as_str())
    .bind(PaymentStatus::Pending)
    .fetch_all(conn)
    .await?;
    let registration = updated.into_iter().next();
    if registration.is_some() {
        debug!("🗃️ Registration {id} is now confirmed");
    }
    Ok(registration)
}

/// Moves a registration from `pending` to `cancelled`. Counterpart of [`confirm_if_pending`].
pub async fn cancel_if_pending(
    id: &RegistrationId,
    conn: &mut SqliteConnection,
) -> Result<Option<Registration>, sqlx::Error> {
    // Step the statement to completion so that it is reset before the caller commits
    let updated: Vec<Registration> = sqlx::query_as(
        r#"
            UPDATE registrations SET payment_status = $1, updated_at = $2
            WHERE id = $3 AND payment_status = $4
            RETURNING *
        "#,
    )
    .bind(PaymentStatus::Cancelled)
    .bind(Utc::now())
    .bind(id.as_str())
    .bind(PaymentStatus::Pending)
    .fetch_all(conn)
    .await?;
    let registration = updated.into_iter().next();
    if registration.is_some() {
        debug!("🗃️ Registration {id} is now cancelled");
    }
    Ok(registration)
}
