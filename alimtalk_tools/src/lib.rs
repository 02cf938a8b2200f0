//! A small client for sending KakaoTalk alimtalk template messages through an NHN Cloud style messaging API.
//!
//! Every message is rendered by the provider from a pre-approved template. We only supply the template code and the
//! values for its `#{placeholders}`.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::AlimtalkApi;
pub use config::AlimtalkConfig;
pub use data_objects::{AlimtalkMessage, AlimtalkResponse, Recipient, ResponseHeader, SendRequest};
pub use error::AlimtalkApiError;
