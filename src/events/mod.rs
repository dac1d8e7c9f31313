//! Transaction lifecycle notifications.
//!
//! This module provides:
//! - `TransactionEvent`: what happened to which request's transaction
//! - `EventSink`: fire-and-forget notification target
//! - `EventBus`: process-wide publisher fanning out to subscribers
//! - `EventTrail`: in-memory subscriber recording every event
//!
//! Subscribers see events of one request in the order the transaction
//! boundary fires them. No ordering is promised between subscribers.

mod bus;
mod event;
mod trail;

pub use bus::{EventBus, EventSink, Subscriber};
pub use event::{TransactionEvent, TransactionEventKind};
pub use trail::EventTrail;
