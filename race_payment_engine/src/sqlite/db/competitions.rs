use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{Competition, NewCompetition, NewParticipationGroup, ParticipationGroup};

pub async fn insert_competition(
    competition: NewCompetition,
    conn: &mut SqliteConnection,
) -> Result<Competition, sqlx::Error> {
    let competition = sqlx::query_as(
        r#"
            INSERT INTO competitions (title, date, location, max_participants, current_participants, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING *
        "#,
    )
    .bind(competition.title)
    .bind(competition.date)
    .bind(competition.location)
    .bind(competition.max_participants)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Inserted new competition: {competition:?}");
    Ok(competition)
}

pub async fn fetch_competition(id: i64, conn: &mut SqliteConnection) -> Result<Option<Competition>, sqlx::Error> {
    let competition =
        sqlx::query_as("SELECT * FROM competitions WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(competition)
}

pub async fn insert_participation_group(
    group: NewParticipationGroup,
    conn: &mut SqliteConnection,
) -> Result<ParticipationGroup, sqlx::Error> {
    let group = sqlx::query_as(
        r#"
            INSERT INTO participation_groups (competition_id, name, distance, entry_fee, max_participants)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
        "#,
    )
    .bind(group.competition_id)
    .bind(group.name)
    .bind(group.distance)
    .bind(group.entry_fee)
    .bind(group.max_participants)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Inserted new participation group: {group:?}");
    Ok(group)
}

pub async fn fetch_participation_group(
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ParticipationGroup>, sqlx::Error> {
    let group =
        sqlx::query_as("SELECT * FROM participation_groups WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(group)
}

pub async fn fetch_groups_for_competition(
    competition_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<ParticipationGroup>, sqlx::Error> {
    let groups = sqlx::query_as("SELECT * FROM participation_groups WHERE competition_id = $1 ORDER BY id")
        .bind(competition_id)
        .fetch_all(conn)
        .await?;
    Ok(groups)
}

/// Takes one place in the competition if it has room. Returns `None` if the competition does not exist or is full.
pub async fn claim_competition_place(
    competition_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Competition>, sqlx::Error> {
    let competition = sqlx::query_as(
        r#"
            UPDATE competitions SET current_participants = current_participants + 1
            WHERE id = $1 AND (max_participants IS NULL OR current_participants < max_participants)
            RETURNING *
        "#,
    )
    .bind(competition_id)
    .fetch_optional(conn)
    .await?;
    Ok(competition)
}

/// Takes one place in the group if it belongs to the competition and has room.
pub async fn claim_group_place(
    group_id: i64,
    competition_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ParticipationGroup>, sqlx::Error> {
    let group = sqlx::query_as(
        r#"
            UPDATE participation_groups SET current_participants = current_participants + 1
            WHERE id = $1 AND competition_id = $2
              AND (max_participants IS NULL OR current_participants < max_participants)
            RETURNING *
        "#,
    )
    .bind(group_id)
    .bind(competition_id)
    .fetch_optional(conn)
    .await?;
    Ok(group)
}

pub async fn release_competition_place(competition_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE competitions SET current_participants = current_participants - 1 WHERE id = $1 AND \
         current_participants > 0",
    )
    .bind(competition_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn release_group_place(group_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE participation_groups SET current_participants = current_participants - 1 WHERE id = $1 AND \
         current_participants > 0",
    )
    .bind(group_id)
    .execute(conn)
    .await?;
    Ok(())
}
