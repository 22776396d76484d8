//! Runtime events: types and broadcast bus.
//!
//! Groups the event **data model** and the **bus** used to publish/subscribe to
//! runtime events emitted by the dispatcher worker, the lifecycle supervisor and
//! the device facade.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Device` (admission/rejection, cancel), the worker
//!   (started/completed/failed), the supervisor (reconnect, idle close, phase
//!   changes, terminated).
//! - **Consumers**: the subscriber fan-out pump
//!   ([`SubscriberSet::forward`](crate::subscribers::SubscriberSet::forward)) and
//!   any receiver from [`Device::events`](crate::Device::events).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
