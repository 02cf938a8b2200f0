//! Payment confirmation notices.
//!
//! [`PaymentNotifier`] turns a confirmed registration into a [`PaymentConfirmedMessage`] and hands it to a
//! [`NotificationSender`]. It is wired in as a [`PaymentConfirmedEvent`] hook with [`payment_confirmed_hook`], so it
//! only ever runs after the confirmation has been committed, on its own task.
//!
//! Notifications are best effort. Nothing in here returns an error: failures are logged and dropped.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::{
    db_types::ReconciliationView,
    events::PaymentConfirmedEvent,
    helpers::format_event_date,
    traits::{FeatureFlags, NotificationSender, PaymentConfirmedMessage},
};

/// The `sms_settings` feature that switches payment confirmation notices on and off.
pub const PAYMENT_CONFIRMED_FEATURE: &str = "payment_confirmed";

pub struct PaymentNotifier<F, N> {
    flags: F,
    sender: N,
}

impl<F, N> PaymentNotifier<F, N>
where
    F: FeatureFlags,
    N: NotificationSender,
{
    pub fn new(flags: F, sender: N) -> Self {
        Self { flags, sender }
    }

    /// Sends the payment confirmed notice for the registration if the feature is enabled.
    pub async fn notify_payment_confirmed(&self, registration: &ReconciliationView) {
        let id = &registration.id;
        match self.flags.is_enabled(PAYMENT_CONFIRMED_FEATURE).await {
            Ok(true) => {},
            Ok(false) => {
                debug!("📨️ Payment confirmed notices are switched off. Nothing sent for {id}");
                return;
            },
            Err(e) => {
                warn!("📨️ Could not read the notification settings. Nothing sent for {id}. {e}");
                return;
            },
        }
        let message = match payment_confirmed_message(registration) {
            Some(m) => m,
            None => {
                warn!("📨️ Registration {id} has no competition date. No payment confirmed notice sent.");
                return;
            },
        };
        match self.sender.send_payment_confirmed(&message).await {
            Ok(()) => info!("📨️ Payment confirmed notice sent for {id}"),
            Err(e) => warn!("📨️ Payment confirmed notice for {id} could not be sent. {e}"),
        }
    }
}

/// Builds the notice for a registration. Returns `None` if the competition date is unknown, e.g. because the
/// competition row is missing.
pub fn payment_confirmed_message(registration: &ReconciliationView) -> Option<PaymentConfirmedMessage> {
    let event_date = format_event_date(registration.competition_date.as_ref()?);
    Some(PaymentConfirmedMessage {
        phone: registration.phone.clone(),
        name: registration.name.clone(),
        event_date,
        location: registration.competition_location.clone().unwrap_or_default(),
        distance: registration.resolved_distance().unwrap_or_default().to_string(),
        fee: registration.entry_fee.to_grouped_string(),
    })
}

/// Wraps the notifier as a [`PaymentConfirmedEvent`] hook, for use with
/// [`EventHooks::on_payment_confirmed`](crate::events::EventHooks::on_payment_confirmed).
pub fn payment_confirmed_hook<F, N>(
    notifier: PaymentNotifier<F, N>,
) -> impl Fn(PaymentConfirmedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static
where
    F: FeatureFlags + Send + Sync + 'static,
    N: NotificationSender + Send + Sync + 'static,
{
    let notifier = Arc::new(notifier);
    move |ev: PaymentConfirmedEvent| {
        let notifier = Arc::clone(&notifier);
        Box::pin(async move {
            notifier.notify_payment_confirmed(&ev.registration).await;
        })
    }
}
