//! Race Payment Engine
//!
//! The race payment engine tracks whether entrants to a race have paid their entry fee. Entrants pay by bank
//! transfer; an external bank-matching agent matches incoming transfers to registrations and tells us which ones have
//! been paid. This library contains the core logic for that flow. It knows nothing about HTTP.
//!
//! The library is divided into these main sections:
//! 1. Storage ([`traits`] and, with the `sqlite` feature, [`SqliteDatabase`]). The engine talks to storage through the
//!    traits only. The data types stored are defined in [`db_types`].
//! 2. The public API. [`PaymentFlowApi`] owns the `pending -> confirmed | cancelled` state machine,
//!    [`ReconciliationApi`] serves the bank-matching agent and [`RegistrationApi`] creates registrations.
//! 3. Events ([`events`]). The payment flow publishes a `PaymentConfirmedEvent` after every committed confirmation.
//!    Hooks subscribe to these without access to the engine's internals. The [`notifications`] module provides the
//!    hook that sends payment confirmation notices.
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod notifications;
mod rpe_api;
pub mod traits;

#[cfg(all(feature = "sqlite", any(feature = "test_utils", test)))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use rpe_api::{
    payment_flow_api::PaymentFlowApi,
    reconciliation_api::ReconciliationApi,
    reconciliation_objects,
    registration_api::RegistrationApi,
};
pub use traits::{RegistrationDatabase, RegistrationError, RegistrationManagement};
