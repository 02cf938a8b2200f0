//! Outbound integrations. Each one is wired into the server as a set of event hooks.
pub mod alimtalk;
