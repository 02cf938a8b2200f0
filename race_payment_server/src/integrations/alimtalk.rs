use alimtalk_tools::{AlimtalkApi, AlimtalkApiError, AlimtalkConfig, AlimtalkMessage};
use log::*;
use race_payment_engine::{
    events::EventHooks,
    notifications::{payment_confirmed_hook, PaymentNotifier},
    traits::{FeatureFlags, NotificationError, NotificationSender, PaymentConfirmedMessage},
};
use rpg_common::helpers::normalize_phone_number;

/// Delivers registrant notices as alimtalk template messages.
#[derive(Clone, Debug)]
pub struct AlimtalkNotifier {
    api: AlimtalkApi,
}

impl AlimtalkNotifier {
    pub fn new(api: AlimtalkApi) -> Self {
        Self { api }
    }
}

impl NotificationSender for AlimtalkNotifier {
    async fn send_payment_confirmed(&self, message: &PaymentConfirmedMessage) -> Result<(), NotificationError> {
        let msg = payment_confirmed_template(message)?;
        trace!("📨️ Sending payment confirmed alimtalk to {}", msg.recipient_no);
        self.api.send(msg).await.map(|_| ()).map_err(|e| match e {
            AlimtalkApiError::Rejected { .. } | AlimtalkApiError::QueryError { .. } => {
                NotificationError::Rejected(e.to_string())
            },
            e => NotificationError::Unreachable(e.to_string()),
        })
    }
}

/// Fills the payment confirmed template's placeholders.
pub fn payment_confirmed_template(message: &PaymentConfirmedMessage) -> Result<AlimtalkMessage, NotificationError> {
    let recipient = normalize_phone_number(&message.phone);
    if recipient.is_empty() {
        return Err(NotificationError::InvalidMessage(format!("{} has no usable phone number", message.name)));
    }
    Ok(AlimtalkMessage::new(recipient)
        .with_parameter("name", message.name.as_str())
        .with_parameter("eventDate", message.event_date.as_str())
        .with_parameter("location", message.location.as_str())
        .with_parameter("distance", message.distance.as_str())
        .with_parameter("fee", message.fee.as_str()))
}

/// Event hooks that send a payment confirmed alimtalk whenever a payment is confirmed and the `payment_confirmed`
/// feature is switched on in `flags`.
pub fn create_notification_hooks<F>(config: AlimtalkConfig, flags: F) -> Result<EventHooks, AlimtalkApiError>
where F: FeatureFlags + Send + Sync + 'static {
    let api = AlimtalkApi::new(config)?;
    let notifier = PaymentNotifier::new(flags, AlimtalkNotifier::new(api));
    let mut hooks = EventHooks::default();
    hooks.on_payment_confirmed(payment_confirmed_hook(notifier));
    info!("📨️ Payment confirmed notices will be sent with alimtalk");
    Ok(hooks)
}
