use thiserror::Error;

use crate::{
    db_types::{
        Competition,
        NewCompetition,
        NewParticipationGroup,
        NewRegistration,
        ParticipationGroup,
        PaymentStatus,
        Registration,
        RegistrationId,
    },
    traits::RegistrationManagement,
};

/// This trait defines the mutations of the registration store.
///
/// The payment state machine relies on [`Self::confirm_if_pending`] and [`Self::cancel_if_pending`] being single
/// conditional writes: the status check and the update must not be separable by a concurrent caller.
#[allow(async_fn_in_trait)]
pub trait RegistrationDatabase: RegistrationManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    async fn insert_competition(&self, competition: NewCompetition) -> Result<Competition, RegistrationError>;

    async fn insert_participation_group(
        &self,
        group: NewParticipationGroup,
    ) -> Result<ParticipationGroup, RegistrationError>;

    /// Takes a new registration, and in a single atomic transaction,
    /// * rejects it with [`RegistrationError::DuplicateRegistration`] if the member already holds a live
    ///   (not cancelled) registration for the competition,
    /// * fills in the entry fee and distance from the participation group where they were not given,
    /// * claims a place on the participation group and competition counters, failing with
    ///   [`RegistrationError::CapacityExceeded`] if either is full,
    /// * stores the registration with `pending` status.
    async fn insert_registration(&self, registration: NewRegistration) -> Result<Registration, RegistrationError>;

    /// Sets `payment_status = confirmed` iff the registration is currently `pending`.
    ///
    /// Returns the updated record, or `None` if no row matched, i.e. the registration does not exist or is not
    /// pending. The capacity counters are not touched.
    async fn confirm_if_pending(&self, id: &RegistrationId) -> Result<Option<Registration>, RegistrationError>;

    /// Sets `payment_status = cancelled` iff the registration is currently `pending`, and in the same transaction
    /// releases its place on the participation group and competition counters.
    ///
    /// Returns `None` if no row matched.
    async fn cancel_if_pending(&self, id: &RegistrationId) -> Result<Option<Registration>, RegistrationError>;

    /// Creates or updates a notification feature flag.
    async fn set_feature_flag(&self, feature: &str, enabled: bool) -> Result<(), RegistrationError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), RegistrationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum RegistrationError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(RegistrationId),
    #[error("Order {id} cannot change status. It is currently {current}")]
    InvalidStateTransition { id: RegistrationId, current: PaymentStatus },
    #[error("The requested competition {0} does not exist")]
    CompetitionNotFound(i64),
    #[error("The requested participation group {0} does not exist for this competition")]
    GroupNotFound(i64),
    #[error("Member {user_id} is already registered for competition {competition_id}")]
    DuplicateRegistration { competition_id: i64, user_id: String },
    #[error("Cannot register, since {0} is full")]
    CapacityExceeded(String),
    #[error("The registration is incomplete. {0}")]
    InvalidRegistration(String),
    #[error("Cannot insert registration, since it already exists with id {0}")]
    RegistrationAlreadyExists(RegistrationId),
}

impl From<sqlx::Error> for RegistrationError {
    fn from(e: sqlx::Error) -> Self {
        RegistrationError::DatabaseError(e.to_string())
    }
}
