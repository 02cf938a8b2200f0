//! # Race payment server
//! This crate hosts the HTTP server for race registration payments. It is responsible for:
//! * Serving the bank-matching agent's webhook: listing the registrations that are waiting for a bank transfer, and
//!   accepting confirmations once transfers have been matched.
//! * Wiring payment confirmation events to the alimtalk notification provider.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `GET /bank/orders`: All orders awaiting payment.
//! * `POST /bank/order`: A single order, by id.
//! * `POST|PUT /bank/confirm`: Confirm a batch of orders as paid.
//!
//! The `/bank` routes speak the bank-matching agent's protocol. Every protocol response, failures included, carries
//! HTTP status 200; the outcome is in the body's `return_code`.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
#[cfg(feature = "alimtalk")]
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
