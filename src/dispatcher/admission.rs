//! # Admission policy for submitted commands.
//!
//! The dispatcher treats commands as **slots** identified by `tag`: at any given
//! time at most one command per tag may be outstanding (enqueued or executing).
//! Admission decides, at submit time, whether a command enters the queue.
//!
//! ## Rules
//! A command is admitted iff all of:
//! - the device has not been cancelled,
//! - the outstanding count is below the configured capacity,
//! - the tag is non-empty after trimming whitespace,
//! - no command with the same tag is currently outstanding.
//!
//! ## Rejection semantics
//! Rejection is a deliberate backpressure/dedup policy, not an error: the submit
//! call itself never fails. The rejected command is dropped (its completion
//! resolves to `None`) and a `CommandRejected` event carrying the reason label is
//! published on the bus.

/// Why a command was refused at admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// `cancel()` was called; the device is draining and admits nothing new.
    ShuttingDown,

    /// Outstanding count has reached capacity.
    QueueFull,

    /// The tag is empty or whitespace-only.
    EmptyTag,

    /// A command with this tag is already enqueued or executing.
    DuplicateTag,
}

impl RejectReason {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RejectReason::ShuttingDown => "shutting_down",
            RejectReason::QueueFull => "queue_full",
            RejectReason::EmptyTag => "empty_tag",
            RejectReason::DuplicateTag => "duplicate_tag",
        }
    }
}
