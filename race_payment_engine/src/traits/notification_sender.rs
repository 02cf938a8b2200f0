use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("The notification could not be composed. {0}")]
    InvalidMessage(String),
    #[error("The notification provider rejected the message. {0}")]
    Rejected(String),
    #[error("The notification provider could not be reached. {0}")]
    Unreachable(String),
}

/// Everything the payment-confirmed template needs, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmedMessage {
    pub phone: String,
    pub name: String,
    /// e.g. `2025년 4월 6일 08:00`
    pub event_date: String,
    pub location: String,
    pub distance: String,
    /// e.g. `30,000`
    pub fee: String,
}

/// A channel for outbound messages to registrants (alimtalk, SMS, ...).
pub trait NotificationSender {
    fn send_payment_confirmed(
        &self,
        message: &PaymentConfirmedMessage,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;
}
