//! Audit events. The reconciliation and fraud scanning APIs publish an event at the end of every run; anything that
//! wants an audit trail registers a hook for it.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
