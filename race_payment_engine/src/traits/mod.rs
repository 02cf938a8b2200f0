//! # Storage and collaborator interfaces
//!
//! This module defines the contracts the engine needs from the outside world. The engine never talks to a database,
//! a settings table or a messaging provider directly; it is handed something that implements these traits.
//!
//! * [`RegistrationManagement`] provides read access to competitions, participation groups and registrations,
//!   including the joined [`ReconciliationView`](crate::db_types::ReconciliationView) read model.
//! * [`RegistrationDatabase`] adds the mutations: creating registrations (and moving the capacity counters with them)
//!   and the conditional payment status updates that the payment state machine is built on.
//! * [`FeatureFlags`] answers whether a notification type is switched on.
//! * [`NotificationSender`] delivers a message to a registrant.
mod feature_flags;
mod notification_sender;
mod registration_database;
mod registration_management;

pub use feature_flags::{FeatureFlagError, FeatureFlags, StaticFeatureFlags};
pub use notification_sender::{NotificationError, NotificationSender, PaymentConfirmedMessage};
pub use registration_database::{RegistrationDatabase, RegistrationError};
pub use registration_management::RegistrationManagement;
