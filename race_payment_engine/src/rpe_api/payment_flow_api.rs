use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Registration, RegistrationId},
    events::{EventProducers, PaymentConfirmedEvent},
    traits::{RegistrationDatabase, RegistrationError},
};

/// `PaymentFlowApi` drives registrations through the payment state machine:
///
/// ```text
///   pending ──confirm──> confirmed
///      └─────cancel────> cancelled
/// ```
///
/// Both target states are final.
pub struct PaymentFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for PaymentFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B> PaymentFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> PaymentFlowApi<B>
where B: RegistrationDatabase
{
    /// Marks a pending registration as paid.
    ///
    /// Errors:
    /// * [`RegistrationError::OrderNotFound`] if there is no such registration.
    /// * [`RegistrationError::InvalidStateTransition`] if it is not pending. This includes losing a race against a
    ///   concurrent confirmation of the same registration.
    /// * [`RegistrationError::DatabaseError`] if the store failed.
    ///
    /// On success a [`PaymentConfirmedEvent`] is published to the hook subscribers. Hook failures are not reported
    /// back to the caller.
    pub async fn confirm(&self, id: &RegistrationId) -> Result<Registration, RegistrationError> {
        match self.db.confirm_if_pending(id).await? {
            Some(registration) => {
                info!("🔄️✅️ Registration {id} has been confirmed");
                self.call_payment_confirmed_hook(id).await;
                Ok(registration)
            },
            None => Err(self.classify_failed_transition(id).await?),
        }
    }

    /// Withdraws a pending registration and frees its place in the competition and participation group.
    pub async fn cancel(&self, id: &RegistrationId) -> Result<Registration, RegistrationError> {
        match self.db.cancel_if_pending(id).await? {
            Some(registration) => {
                info!("🔄️❌️ Registration {id} has been cancelled");
                Ok(registration)
            },
            None => Err(self.classify_failed_transition(id).await?),
        }
    }

    /// The conditional update matched nothing. Work out why from the current record.
    async fn classify_failed_transition(&self, id: &RegistrationId) -> Result<RegistrationError, RegistrationError> {
        let err = match self.db.fetch_registration(id).await? {
            None => RegistrationError::OrderNotFound(id.clone()),
            Some(r) => {
                debug!("🔄️ Registration {id} is {} and cannot change status", r.payment_status);
                RegistrationError::InvalidStateTransition { id: id.clone(), current: r.payment_status }
            },
        };
        Ok(err)
    }

    async fn call_payment_confirmed_hook(&self, id: &RegistrationId) {
        if self.producers.payment_confirmed_producer.is_empty() {
            return;
        }
        let view = match self.db.fetch_reconciliation_view(id).await {
            Ok(Some(view)) => view,
            Ok(None) => {
                warn!("🔄️ Registration {id} vanished right after it was confirmed. No event will be published.");
                return;
            },
            Err(e) => {
                warn!("🔄️ Could not load registration {id} for the payment confirmed event. {e}");
                return;
            },
        };
        for emitter in &self.producers.payment_confirmed_producer {
            debug!("🔄️ Notifying payment confirmed hook subscribers");
            emitter.publish_event(PaymentConfirmedEvent::new(view.clone())).await;
        }
    }
}
