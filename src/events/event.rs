//! # Runtime events emitted by the dispatcher and the lifecycle supervisor.
//!
//! [`EventKind`] classifies events across three categories:
//! - **Admission events**: what happened to a submitted command at the gate
//! - **Execution events**: the worker's per-command flow (started, completed, failed)
//! - **Lifecycle events**: supervisor decisions (reconnect, idle close, phase
//!   changes, shutdown, terminal state)
//!
//! [`Event`] carries metadata: timestamp, command tag, reason label, link phase.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore exact order when events are observed out of
//! order across subscribers.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::supervisor::LinkPhase;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Admission events ===
    /// Command passed admission and was enqueued.
    ///
    /// Sets: `tag`, `at`, `seq`.
    CommandAdmitted,

    /// Command was rejected at admission and dropped.
    ///
    /// Sets: `tag`, `reason` (stable label from
    /// [`RejectReason`](crate::RejectReason)), `at`, `seq`.
    CommandRejected,

    // === Execution events ===
    /// Worker dequeued the command and is invoking the transport.
    ///
    /// Sets: `tag`, `at`, `seq`.
    CommandStarted,

    /// Transport exchange succeeded; outcome delivered to the caller.
    ///
    /// Sets: `tag`, `at`, `seq`.
    CommandCompleted,

    /// Transport exchange failed; error delivered to the caller, command settled.
    ///
    /// Sets: `tag`, `reason` (error label), `at`, `seq`.
    CommandFailed,

    // === Lifecycle events ===
    /// Supervisor observed demand on a down link and asked the transport to
    /// reconnect.
    ///
    /// Sets: `at`, `seq`.
    ReconnectRequested,

    /// Reconnect attempt failed; will be retried on a later tick.
    ///
    /// Sets: `reason`, `at`, `seq`.
    ReconnectFailed,

    /// Supervisor closed an idle link (no outstanding commands).
    ///
    /// Sets: `at`, `seq`.
    LinkClosed,

    /// `cancel()` was called; drain-then-terminate has begun.
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// Supervisor-observed phase changed (see
    /// [`LinkPhase`](crate::LinkPhase)).
    ///
    /// Sets: `phase`, `at`, `seq`.
    PhaseChanged,

    /// Terminal state reached: drained, link closed, worker and supervisor stopped.
    ///
    /// Sets: `at`, `seq`.
    Terminated,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Command tag, if applicable.
    pub tag: Option<Arc<str>>,
    /// Human-readable reason (rejection label, transport error, ...).
    pub reason: Option<Arc<str>>,
    /// Link phase (only for `PhaseChanged`).
    pub phase: Option<LinkPhase>,
}

impl Event {
    /// Creates an event of the given kind with the current timestamp and the next
    /// sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            tag: None,
            reason: None,
            phase: None,
        }
    }

    /// Attaches a command tag.
    #[inline]
    pub fn with_tag(mut self, tag: impl Into<Arc<str>>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a link phase.
    #[inline]
    pub fn with_phase(mut self, phase: LinkPhase) -> Self {
        self.phase = Some(phase);
        self
    }
}
