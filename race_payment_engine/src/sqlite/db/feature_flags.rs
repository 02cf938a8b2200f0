use chrono::Utc;
use sqlx::SqliteConnection;

/// Returns `None` if there is no row for the feature.
pub async fn fetch_flag(feature: &str, conn: &mut SqliteConnection) -> Result<Option<bool>, sqlx::Error> {
    let enabled: Option<bool> = sqlx::query_scalar("SELECT enabled FROM sms_settings WHERE feature_name = $1")
        .bind(feature)
        .fetch_optional(conn)
        .await?;
    Ok(enabled)
}

pub async fn upsert_flag(feature: &str, enabled: bool, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO sms_settings (feature_name, enabled, updated_at) VALUES ($1, $2, $3)
            ON CONFLICT (feature_name) DO UPDATE SET enabled = excluded.enabled, updated_at = excluded.updated_at
        "#,
    )
    .bind(feature)
    .bind(enabled)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    Ok(())
}
