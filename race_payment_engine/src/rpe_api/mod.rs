//! # Race payment engine public API
//!
//! The `rpe_api` module exposes the programmatic API for the race payment engine.
//!
//! * [`payment_flow_api`] owns the payment state machine. It is the only place where a registration's
//!   `payment_status` changes, and it emits the post-commit events that drive notifications.
//! * [`reconciliation_api`] serves the bank-matching agent: the list of transfers we are waiting for, a single order
//!   lookup, and batch confirmation.
//! * [`registration_api`] creates registrations and answers capacity and lookup queries.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits the API needs.
//!
//! ```rust,ignore
//! use race_payment_engine::{events::EventProducers, PaymentFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = PaymentFlowApi::new(db, EventProducers::default());
//! let registration = api.confirm(&"R240401120000ABC123".into()).await?;
//! ```
pub mod payment_flow_api;
pub mod reconciliation_api;
pub mod reconciliation_objects;
pub mod registration_api;
