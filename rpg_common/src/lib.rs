mod won;

pub mod helpers;
pub mod op;
mod secret;

pub use secret::Secret;
pub use won::{Won, WonConversionError, KRW_CURRENCY_CODE};
