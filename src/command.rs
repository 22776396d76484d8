//! # Command: one immutable unit of work for the link.
//!
//! A [`Command`] bundles a deduplication tag, a priority, an opaque payload and a
//! one-shot completion sender. It is owned exclusively by the dispatcher from
//! admission until the worker settles it.
//!
//! The caller keeps the matching [`Completion`] handle returned by
//! [`Device::submit`](crate::Device::submit). Completion is a one-shot channel, not
//! a callback chain: exactly one outcome is ever delivered, and a command that was
//! never admitted resolves to `None` (its sender is dropped on rejection).

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::TransportError;

/// Outcome of one command: the device's reply bytes, or the transport failure.
pub type CommandResult = Result<Vec<u8>, TransportError>;

/// Immutable unit of work: tag, priority, payload, completion sender.
pub(crate) struct Command {
    pub tag: Arc<str>,
    pub priority: i32,
    pub payload: Vec<u8>,
    pub done: oneshot::Sender<CommandResult>,
}

impl Command {
    /// Builds a command plus the caller-side completion handle.
    pub fn new(tag: impl Into<Arc<str>>, payload: Vec<u8>, priority: i32) -> (Self, Completion) {
        let (done, rx) = oneshot::channel();
        let cmd = Self {
            tag: tag.into(),
            priority,
            payload,
            done,
        };
        (cmd, Completion { rx })
    }

    /// Delivers the outcome to the caller.
    ///
    /// A caller that dropped its [`Completion`] is fine; the outcome is discarded.
    pub fn resolve(self, result: CommandResult) {
        let _ = self.done.send(result);
    }
}

/// Caller-side handle resolving to a command's outcome.
///
/// - `Some(Ok(reply))` — executed, device replied
/// - `Some(Err(e))` — executed, transport failed
/// - `None` — never executed: rejected at admission (queue full, duplicate tag,
///   empty tag, or device shutting down), or the device was dropped first
pub struct Completion {
    rx: oneshot::Receiver<CommandResult>,
}

impl Completion {
    /// Waits for the command's outcome.
    pub async fn outcome(self) -> Option<CommandResult> {
        self.rx.await.ok()
    }

    /// Non-blocking probe: `Some` once the outcome has arrived.
    pub fn try_outcome(&mut self) -> Option<CommandResult> {
        self.rx.try_recv().ok()
    }
}
