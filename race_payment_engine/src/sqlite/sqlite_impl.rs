//! `SqliteDatabase` is a concrete implementation of a race payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
//!
//! [`traits`]: crate::traits
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{competitions, db_url, feature_flags, new_pool, registrations};
use crate::{
    db_types::{
        Competition,
        NewCompetition,
        NewParticipationGroup,
        NewRegistration,
        ParticipationGroup,
        ReconciliationView,
        Registration,
        RegistrationId,
    },
    traits::{FeatureFlagError, FeatureFlags, RegistrationDatabase, RegistrationError, RegistrationManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl RegistrationManagement for SqliteDatabase {
    async fn fetch_competition(&self, id: i64) -> Result<Option<Competition>, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let competition = competitions::fetch_competition(id, &mut conn).await?;
        Ok(competition)
    }

    async fn fetch_participation_group(&self, id: i64) -> Result<Option<ParticipationGroup>, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let group = competitions::fetch_participation_group(id, &mut conn).await?;
        Ok(group)
    }

    async fn fetch_groups_for_competition(
        &self,
        competition_id: i64,
    ) -> Result<Vec<ParticipationGroup>, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let groups = competitions::fetch_groups_for_competition(competition_id, &mut conn).await?;
        Ok(groups)
    }

    async fn fetch_registration(&self, id: &RegistrationId) -> Result<Option<Registration>, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let registration = registrations::fetch_registration(id, &mut conn).await?;
        Ok(registration)
    }

    async fn fetch_reconciliation_view(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<ReconciliationView>, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let view = registrations::fetch_reconciliation_view(id, &mut conn).await?;
        Ok(view)
    }

    async fn fetch_pending_views(&self) -> Result<Vec<ReconciliationView>, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let views = registrations::fetch_pending_views(&mut conn).await?;
        Ok(views)
    }

    async fn fetch_registrations_for_user(&self, user_id: &str) -> Result<Vec<Registration>, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let result = registrations::fetch_registrations_for_user(user_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_guest_registrations(
        &self,
        competition_id: i64,
        name: &str,
    ) -> Result<Vec<Registration>, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let result = registrations::fetch_guest_registrations(competition_id, name, &mut conn).await?;
        Ok(result)
    }
}

impl RegistrationDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_competition(&self, competition: NewCompetition) -> Result<Competition, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let competition = competitions::insert_competition(competition, &mut conn).await?;
        debug!("🗃️ Competition #{} ({}) has been saved", competition.id, competition.title);
        Ok(competition)
    }

    async fn insert_participation_group(
        &self,
        group: NewParticipationGroup,
    ) -> Result<ParticipationGroup, RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        let group = competitions::insert_participation_group(group, &mut conn).await?;
        debug!("🗃️ Participation group #{} ({}) has been saved", group.id, group.name);
        Ok(group)
    }

    /// The counter updates come first in the transaction so that it takes the write lock straight away. Any failure
    /// after that rolls the whole transaction back, counters included.
    async fn insert_registration(&self, registration: NewRegistration) -> Result<Registration, RegistrationError> {
        let mut registration = registration;
        let competition_id = registration.competition_id;
        let mut tx = self.pool.begin().await?;
        let group = match registration.participation_group_id {
            Some(group_id) => match competitions::claim_group_place(group_id, competition_id, &mut tx).await? {
                Some(group) => Some(group),
                None => {
                    let err = match competitions::fetch_participation_group(group_id, &mut tx).await? {
                        Some(g) if g.competition_id == competition_id => RegistrationError::CapacityExceeded(g.name),
                        _ => RegistrationError::GroupNotFound(group_id),
                    };
                    return Err(err);
                },
            },
            None => None,
        };
        if competitions::claim_competition_place(competition_id, &mut tx).await?.is_none() {
            let err = match competitions::fetch_competition(competition_id, &mut tx).await? {
                Some(c) => RegistrationError::CapacityExceeded(c.title),
                None => RegistrationError::CompetitionNotFound(competition_id),
            };
            return Err(err);
        }
        if let Some(user_id) = registration.user_id.as_deref() {
            if registrations::find_live_registration_for_user(competition_id, user_id, &mut tx).await?.is_some() {
                return Err(RegistrationError::DuplicateRegistration { competition_id, user_id: user_id.to_string() });
            }
        }
        let entry_fee = match (registration.entry_fee, group.as_ref()) {
            (Some(fee), _) => fee,
            (None, Some(g)) => g.entry_fee,
            (None, None) => {
                return Err(RegistrationError::InvalidRegistration(
                    "An entry fee is required when no participation group is given".into(),
                ))
            },
        };
        if registration.distance.is_none() {
            registration.distance = group.as_ref().and_then(|g| g.distance.clone());
        }
        let id = registration.id.take().unwrap_or_else(RegistrationId::random);
        if registrations::fetch_registration(&id, &mut tx).await?.is_some() {
            return Err(RegistrationError::RegistrationAlreadyExists(id));
        }
        let registration = registrations::insert_registration(&id, registration, entry_fee, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Registration {} for competition #{competition_id} has been saved", registration.id);
        Ok(registration)
    }

    async fn confirm_if_pending(&self, id: &RegistrationId) -> Result<Option<Registration>, RegistrationError> {
        // The busy timeout on the pool queues concurrent writers
        let mut tx = self.pool.begin().await?;
        let registration = registrations::confirm_if_pending(id, &mut tx).await?;
        tx.commit().await?;
        Ok(registration)
    }

    async fn cancel_if_pending(&self, id: &RegistrationId) -> Result<Option<Registration>, RegistrationError> {
        let mut tx = self.pool.begin().await?;
        let registration = match registrations::cancel_if_pending(id, &mut tx).await? {
            Some(r) => r,
            None => return Ok(None),
        };
        if let Some(group_id) = registration.participation_group_id {
            competitions::release_group_place(group_id, &mut tx).await?;
        }
        competitions::release_competition_place(registration.competition_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Registration {id} cancelled and its place released");
        Ok(Some(registration))
    }

    async fn set_feature_flag(&self, feature: &str, enabled: bool) -> Result<(), RegistrationError> {
        let mut conn = self.pool.acquire().await?;
        feature_flags::upsert_flag(feature, enabled, &mut conn).await?;
        info!("🗃️ Feature flag {feature} set to {enabled}");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), RegistrationError> {
        self.pool.close().await;
        Ok(())
    }
}

impl FeatureFlags for SqliteDatabase {
    async fn is_enabled(&self, feature: &str) -> Result<bool, FeatureFlagError> {
        let to_err =
            |e: sqlx::Error| FeatureFlagError::LookupFailed { feature: feature.to_string(), reason: e.to_string() };
        let mut conn = self.pool.acquire().await.map_err(to_err)?;
        let enabled = feature_flags::fetch_flag(feature, &mut conn).await.map_err(to_err)?;
        Ok(enabled.unwrap_or(false))
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `RPG_DATABASE_URL`, or the default.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
