use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{
        CompetitionCapacity,
        GroupCapacity,
        NewRegistration,
        ParticipantCount,
        Registration,
        RegistrationId,
    },
    helpers::verify_guest_password,
    traits::{RegistrationDatabase, RegistrationError},
};

/// Entry point for new registrations, plus the queries entrants make about their own registrations.
pub struct RegistrationApi<B> {
    db: B,
}

impl<B> Debug for RegistrationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RegistrationApi")
    }
}

impl<B> RegistrationApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> RegistrationApi<B>
where B: RegistrationDatabase
{
    /// Registers an entrant. The registration starts out `pending` until the bank transfer is matched.
    ///
    /// See [`RegistrationDatabase::insert_registration`] for the checks that are applied.
    pub async fn register(&self, registration: NewRegistration) -> Result<Registration, RegistrationError> {
        let name = registration.name.clone();
        let registration = self.db.insert_registration(registration).await.map_err(|e| {
            debug!("🔄️ Registration for {name} was rejected. {e}");
            e
        })?;
        info!("🔄️ New registration {} for competition #{}", registration.id, registration.competition_id);
        Ok(registration)
    }

    pub async fn registration(&self, id: &RegistrationId) -> Result<Option<Registration>, RegistrationError> {
        self.db.fetch_registration(id).await
    }

    pub async fn registrations_for_user(&self, user_id: &str) -> Result<Vec<Registration>, RegistrationError> {
        self.db.fetch_registrations_for_user(user_id).await
    }

    /// Finds a guest registration from the registrant's name and the password they chose when registering.
    ///
    /// Returns `None` if nothing matches. A wrong password and an unknown name are indistinguishable to the caller.
    pub async fn find_guest_registration(
        &self,
        competition_id: i64,
        name: &str,
        password: &str,
    ) -> Result<Option<Registration>, RegistrationError> {
        let candidates = self.db.fetch_guest_registrations(competition_id, name).await?;
        let found = candidates.into_iter().find(|r| {
            r.guest_password_hash.as_deref().map(|hash| verify_guest_password(password, hash)).unwrap_or(false)
        });
        Ok(found)
    }

    /// Current entrant counts for the competition and each of its participation groups.
    pub async fn capacity_for_competition(&self, competition_id: i64) -> Result<CompetitionCapacity, RegistrationError> {
        let competition = self
            .db
            .fetch_competition(competition_id)
            .await?
            .ok_or(RegistrationError::CompetitionNotFound(competition_id))?;
        let groups = self
            .db
            .fetch_groups_for_competition(competition_id)
            .await?
            .into_iter()
            .map(|g| GroupCapacity {
                group_id: g.id,
                name: g.name,
                count: ParticipantCount { current: g.current_participants, max: g.max_participants },
            })
            .collect();
        let count = ParticipantCount { current: competition.current_participants, max: competition.max_participants };
        Ok(CompetitionCapacity { competition_id, count, groups })
    }
}
