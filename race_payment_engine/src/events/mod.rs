mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::PaymentConfirmedEvent;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
