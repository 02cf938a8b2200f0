use crate::{
    db_types::{Competition, ParticipationGroup, ReconciliationView, Registration, RegistrationId},
    traits::RegistrationError,
};

/// Read access to the registration store.
///
/// [`RegistrationDatabase`](crate::traits::RegistrationDatabase) holds the machinery that changes registrations;
/// `RegistrationManagement` only ever queries.
#[allow(async_fn_in_trait)]
pub trait RegistrationManagement {
    async fn fetch_competition(&self, id: i64) -> Result<Option<Competition>, RegistrationError>;

    async fn fetch_participation_group(&self, id: i64) -> Result<Option<ParticipationGroup>, RegistrationError>;

    /// All participation groups of a competition, in insertion order.
    async fn fetch_groups_for_competition(
        &self,
        competition_id: i64,
    ) -> Result<Vec<ParticipationGroup>, RegistrationError>;

    async fn fetch_registration(&self, id: &RegistrationId) -> Result<Option<Registration>, RegistrationError>;

    /// The registration joined with its competition and participation group.
    async fn fetch_reconciliation_view(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<ReconciliationView>, RegistrationError>;

    /// Every `pending` registration, newest first. Ties on `created_at` are broken by id, descending, so the result is
    /// stable between calls.
    async fn fetch_pending_views(&self) -> Result<Vec<ReconciliationView>, RegistrationError>;

    /// All registrations made by the given member, newest first.
    async fn fetch_registrations_for_user(&self, user_id: &str) -> Result<Vec<Registration>, RegistrationError>;

    /// Guest registrations for a competition that were made under the given registrant name.
    async fn fetch_guest_registrations(
        &self,
        competition_id: i64,
        name: &str,
    ) -> Result<Vec<Registration>, RegistrationError>;
}
