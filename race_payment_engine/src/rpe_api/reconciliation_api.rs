use std::fmt::Debug;

use futures_util::future::join_all;
use log::*;

use crate::{
    db_types::{PaymentStatus, RegistrationId},
    events::EventProducers,
    rpe_api::{
        payment_flow_api::PaymentFlowApi,
        reconciliation_objects::{BankAccount, ConfirmOutcome, ConfirmResult, OrderRecord},
    },
    traits::{RegistrationDatabase, RegistrationError},
};

/// The bank-matching agent's view onto registrations.
///
/// The agent polls [`Self::list_pending_orders`] for the transfers it should look out for, and calls
/// [`Self::confirm_orders`] once it has matched transfers to orders. Confirmation goes through [`PaymentFlowApi`], so
/// the usual post-commit events fire.
pub struct ReconciliationApi<B> {
    flow: PaymentFlowApi<B>,
    account: BankAccount,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi ({:?})", self.account)
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, producers: EventProducers, account: BankAccount) -> Self {
        Self { flow: PaymentFlowApi::new(db, producers), account }
    }

    pub fn flow(&self) -> &PaymentFlowApi<B> {
        &self.flow
    }

    pub fn bank_account(&self) -> &BankAccount {
        &self.account
    }
}

impl<B> ReconciliationApi<B>
where B: RegistrationDatabase
{
    /// Every order still waiting for its transfer, newest first.
    pub async fn list_pending_orders(&self) -> Result<Vec<OrderRecord>, RegistrationError> {
        let views = self.flow.db().fetch_pending_views().await?;
        let orders = views.iter().map(|v| OrderRecord::from_view(v, &self.account)).collect::<Vec<_>>();
        debug!("🏦️ {} pending orders listed", orders.len());
        Ok(orders)
    }

    /// Looks up a single order, whatever its payment status. Fails with [`RegistrationError::OrderNotFound`] if there
    /// is no such registration.
    pub async fn order_detail(&self, id: &RegistrationId) -> Result<OrderRecord, RegistrationError> {
        let view = self
            .flow
            .db()
            .fetch_reconciliation_view(id)
            .await?
            .ok_or_else(|| RegistrationError::OrderNotFound(id.clone()))?;
        Ok(OrderRecord::from_view(&view, &self.account))
    }

    /// Confirms each order independently. One order failing never stops the others.
    ///
    /// The results are in the same order as `ids`. Store failures are reported against the order they hit, so the
    /// caller always learns which orders were confirmed.
    pub async fn confirm_orders(&self, ids: &[RegistrationId]) -> Vec<ConfirmResult> {
        debug!("🏦️ Confirming a batch of {} orders", ids.len());
        let results = join_all(ids.iter().map(|id| self.confirm_order(id))).await;
        let failures = results.iter().filter(|r| !r.outcome.is_success()).count();
        info!("🏦️ Batch complete. {} confirmed, {failures} failed", results.len() - failures);
        results
    }

    async fn confirm_order(&self, id: &RegistrationId) -> ConfirmResult {
        let outcome = match self.flow.db().fetch_registration(id).await {
            Err(e) => {
                warn!("🏦️ Could not look up order {id}. {e}");
                ConfirmOutcome::UpdateFailed(e.to_string())
            },
            Ok(None) => ConfirmOutcome::NotFound,
            Ok(Some(r)) if r.payment_status != PaymentStatus::Pending => ConfirmOutcome::NotPending(r.payment_status),
            Ok(Some(_)) => match self.flow.confirm(id).await {
                Ok(_) => ConfirmOutcome::Confirmed,
                Err(RegistrationError::InvalidStateTransition { current, .. }) => ConfirmOutcome::NotPending(current),
                Err(RegistrationError::OrderNotFound(_)) => ConfirmOutcome::NotFound,
                Err(e) => {
                    warn!("🏦️ Could not confirm order {id}. {e}");
                    ConfirmOutcome::UpdateFailed(e.to_string())
                },
            },
        };
        trace!("🏦️ Order {id}: {}", outcome.description());
        ConfirmResult { order_id: id.to_string(), outcome }
    }
}
