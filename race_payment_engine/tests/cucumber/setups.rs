use chrono::{TimeZone, Utc};
use cucumber::given;
use race_payment_engine::{
    db_types::{NewCompetition, NewParticipationGroup, NewRegistration, Won},
    RegistrationDatabase,
};

use crate::cucumber::{ReconciliationSystem, ReconciliationWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut ReconciliationWorld) {
    let system = ReconciliationSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a competition {string} with a group {string} costing {int} won")]
async fn competition_with_group(world: &mut ReconciliationWorld, title: String, group: String, fee: i64) {
    let db = world.api().flow().db();
    let date = Utc.with_ymd_and_hms(2025, 4, 5, 23, 0, 0).unwrap();
    let competition =
        db.insert_competition(NewCompetition::new(title, date, "여의도 공원".into())).await.expect("Error adding competition");
    let group = db
        .insert_participation_group(NewParticipationGroup::new(competition.id, group, Won::from(fee)))
        .await
        .expect("Error adding group");
    world.group_id = Some(group.id);
    world.competition = Some(competition);
}

#[given(expr = "a pending registration {word} for {string} paying {int} won")]
async fn pending_registration(world: &mut ReconciliationWorld, id: String, depositor: String, fee: i64) {
    let mut registration = NewRegistration::new(world.competition_id(), depositor.clone(), "010-1234-5678".into())
        .with_id(id)
        .with_depositor(depositor)
        .with_entry_fee(Won::from(fee));
    if let Some(group_id) = world.group_id {
        registration = registration.with_group(group_id);
    }
    world.api().flow().db().insert_registration(registration).await.expect("Error adding registration");
}
