//! Subscribers: pluggable event handlers with non-blocking fan-out.
//!
//! - [`Subscribe`] — the extension point for logging, metrics, alerting
//! - [`SubscriberSet`] — one bounded lane per subscriber, pumped off the bus
//! - `LogWriter` — stdout reference subscriber behind the `logging` feature

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
