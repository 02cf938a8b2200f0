#![allow(dead_code)]
use chrono::{DateTime, TimeZone, Utc};
use log::*;
use race_payment_engine::{
    db_types::{Competition, NewCompetition, NewParticipationGroup, NewRegistration, ParticipationGroup, Registration, Won},
    RegistrationDatabase,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("rpg_engine_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

/// A fresh, migrated database in the temp folder.
pub async fn prepare_test_db() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    db.run_migrations().await.expect("Error running migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Could not remove {url}: {e}");
    }
}

pub fn race_day() -> DateTime<Utc> {
    // 2025-04-06 08:00 KST
    Utc.with_ymd_and_hms(2025, 4, 5, 23, 0, 0).unwrap()
}

pub struct Race {
    pub competition: Competition,
    pub ten_k: ParticipationGroup,
}

/// A competition with a single uncapped 10km group costing 30,000 won.
pub async fn seed_race(db: &SqliteDatabase) -> Race {
    let competition = db
        .insert_competition(NewCompetition::new("서울 봄 마라톤", race_day(), "여의도 공원"))
        .await
        .expect("Error inserting competition");
    let ten_k = db
        .insert_participation_group(
            NewParticipationGroup::new(competition.id, "10K", Won::from(30_000)).with_distance("10km"),
        )
        .await
        .expect("Error inserting group");
    Race { competition, ten_k }
}

pub async fn register(db: &SqliteDatabase, race: &Race, id: &str, name: &str) -> Registration {
    let registration = NewRegistration::new(race.competition.id, name, "010-1234-5678")
        .with_id(id)
        .with_group(race.ten_k.id);
    db.insert_registration(registration).await.expect("Error inserting registration")
}
