//! Error types used by the device runtime and the transport boundary.
//!
//! Two error enums:
//!
//! - [`ConfigError`] — invalid construction arguments; fatal, raised by
//!   [`DeviceBuilder::build`](crate::DeviceBuilder::build) and never recovered.
//! - [`TransportError`] — failures reported by the underlying link; local to the
//!   failing command and delivered through its [`Completion`](crate::Completion).
//!
//! Both provide `as_label()` for stable snake_case identifiers in logs/metrics.
//!
//! Admission rejection is deliberately **not** an error type: a rejected command is
//! dropped and reported via a [`CommandRejected`](crate::EventKind::CommandRejected)
//! event (see [`RejectReason`](crate::RejectReason)).

use thiserror::Error;

/// # Errors raised at device construction time.
///
/// These are configuration bugs, not runtime conditions; construction aborts
/// entirely and no background tasks are spawned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `capacity` must be at least 1; a zero-capacity queue can never admit work.
    #[error("capacity must be >= 1")]
    ZeroCapacity,

    /// `tick` must be non-zero; a zero period would spin the supervisor.
    #[error("supervisor tick must be > 0")]
    ZeroTick,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroCapacity => "config_zero_capacity",
            ConfigError::ZeroTick => "config_zero_tick",
        }
    }
}

/// # Errors produced by the transport boundary.
///
/// Raised by [`Transport`](crate::Transport) implementations and forwarded to the
/// failing command's completion. A transport error settles the command (its tag is
/// released) but never stops the worker loop or other queued commands. Retry, if
/// desired, is the caller's responsibility via resubmission.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// I/O failure on the physical link.
    #[error("io error: {0}")]
    Io(String),

    /// Connect or reconnect attempt failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A send was attempted while the link is down.
    #[error("not connected")]
    NotConnected,

    /// The device did not reply within the transport's own deadline.
    #[error("reply timed out")]
    ReplyTimeout,

    /// Anything the other variants do not cover.
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::Io(_) => "transport_io",
            TransportError::ConnectionFailed(_) => "transport_connection_failed",
            TransportError::NotConnected => "transport_not_connected",
            TransportError::ReplyTimeout => "transport_reply_timeout",
            TransportError::Other(_) => "transport_other",
        }
    }
}
