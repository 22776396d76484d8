//! # Device runtime configuration.
//!
//! Provides [`DeviceConfig`], the centralized settings for one device instance.
//!
//! ## Field semantics
//! - `capacity`: upper bound on outstanding commands (enqueued + executing)
//! - `tick`: fixed supervisor period driving reconnect / idle-close decisions
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
//!
//! Values are validated once by [`DeviceBuilder::build`](crate::DeviceBuilder::build);
//! they are never altered at runtime.

use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for a [`Device`](crate::Device) instance.
///
/// Defines:
/// - **Backpressure**: how many commands may be outstanding at once
/// - **Lifecycle cadence**: how often the supervisor inspects demand and link state
/// - **Event system**: bus capacity for event delivery
#[derive(Clone, Debug)]
pub struct DeviceConfig {
    /// Maximum number of outstanding commands (enqueued + executing).
    ///
    /// Submissions beyond this bound are rejected (dropped with a
    /// `CommandRejected` event). Must be at least 1.
    pub capacity: usize,

    /// Supervisor period.
    ///
    /// Each tick the supervisor either terminates (cancelled and drained),
    /// reconnects (demand but no link), or closes an idle link. Must be > 0.
    pub tick: Duration,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items. Minimum value is 1 (enforced by the bus).
    pub bus_capacity: usize,
}

impl DeviceConfig {
    /// Validates the configuration, consuming sentinel mistakes at construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for DeviceConfig {
    /// Default configuration:
    ///
    /// - `capacity = 300`
    /// - `tick = 2s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            capacity: 300,
            tick: Duration::from_secs(2),
            bus_capacity: 1024,
        }
    }
}
