//! # Subscriber contract.
//!
//! [`Subscribe`] is the hook for observing a device's runtime events (logging,
//! metrics, alerting). Each subscriber gets its own **lane**: a bounded queue
//! drained by a dedicated task, so a slow or panicking subscriber never stalls
//! the device or its siblings.

use async_trait::async_trait;

use crate::events::Event;

/// Receives runtime events on a dedicated lane.
///
/// `on_event` runs on the lane's drain task; implementations may do I/O, but a
/// handler slower than the event rate will fill the lane, and events past the
/// bound are shed for this subscriber only.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used when reporting shed events or panics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Bound on this subscriber's lane.
    fn lane_capacity(&self) -> usize {
        256
    }
}
