//! # Worker: the single sequential consumer.
//!
//! One worker task per device drains the [`CommandQueue`] strictly sequentially
//! against the transport. It is the **only** caller of
//! [`Transport::send_and_wait`], which is what guarantees mutual exclusion on the
//! non-reentrant physical link — no pool, no extra locking around the transport.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► park until link is connected AND a command is available
//!   │     (woken by admit() and by the supervisor after a reconnect)
//!   ├─► pop highest-priority command
//!   ├─► publish CommandStarted
//!   ├─► transport.send_and_wait(payload)     (the only blocking point)
//!   ├─► publish CommandCompleted / CommandFailed
//!   ├─► resolve the caller's completion with reply or error
//!   └─► settle: release tag, decrement outstanding
//! }
//! ```
//!
//! ## Rules
//! - A transport failure settles the failing command and **never** stops the
//!   loop; queued commands behind it still run.
//! - Commands are popped only while the link is up, so a reconnect always
//!   precedes execution of work submitted while disconnected.
//! - Cancellation is checked at the park point only; the supervisor cancels this
//!   task exclusively after the queue has drained, so no command is abandoned
//!   mid-exchange.

use std::sync::Arc;

use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::dispatcher::CommandQueue;
use crate::events::{Bus, Event, EventKind};
use crate::transport::Transport;

/// Single sequential consumer of a device's command queue.
pub(crate) struct Worker {
    pub queue: Arc<CommandQueue>,
    pub transport: Arc<dyn Transport>,
    pub bus: Bus,
}

impl Worker {
    /// Runs until `token` is cancelled.
    pub async fn run(self, token: CancellationToken) {
        loop {
            let cmd = loop {
                // Arm the wakeup before re-checking state; a notification that
                // lands in between is stored and consumed by the await below.
                let notified = self.queue.notified();

                if token.is_cancelled() {
                    return;
                }
                if self.transport.is_connected() {
                    if let Some(cmd) = self.queue.pop() {
                        break cmd;
                    }
                }

                select! {
                    _ = notified => {}
                    _ = token.cancelled() => return,
                }
            };

            self.bus
                .publish(Event::now(EventKind::CommandStarted).with_tag(cmd.tag.clone()));

            let result = self.transport.send_and_wait(&cmd.payload).await;

            match &result {
                Ok(_) => self
                    .bus
                    .publish(Event::now(EventKind::CommandCompleted).with_tag(cmd.tag.clone())),
                Err(e) => self.bus.publish(
                    Event::now(EventKind::CommandFailed)
                        .with_tag(cmd.tag.clone())
                        .with_reason(e.to_string()),
                ),
            }

            let tag = cmd.tag.clone();
            cmd.resolve(result);
            self.queue.settle(&tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::error::TransportError;
    use crate::transport::mock::{MockTransport, Reply};

    fn harness(transport: Arc<MockTransport>) -> (Arc<CommandQueue>, Bus, CancellationToken) {
        let queue = Arc::new(CommandQueue::new(16));
        let bus = Bus::new(64);
        let token = CancellationToken::new();
        let worker = Worker {
            queue: queue.clone(),
            transport,
            bus: bus.clone(),
        };
        tokio::spawn(worker.run(token.clone()));
        (queue, bus, token)
    }

    #[tokio::test]
    async fn executes_and_resolves_in_priority_order() {
        // Start disconnected so all three are queued before the worker drains.
        let transport = Arc::new(MockTransport::new());
        let (queue, _bus, token) = harness(transport.clone());

        let mut completions = Vec::new();
        for (tag, prio) in [("A", 5), ("B", 10), ("C", 5)] {
            let (cmd, completion) = Command::new(tag, tag.as_bytes().to_vec(), prio);
            queue.admit(cmd).unwrap();
            completions.push(completion);
        }

        transport.connect().await.unwrap();
        queue.wake_worker();
        for completion in completions {
            assert!(matches!(completion.outcome().await, Some(Ok(_))));
        }

        // B first by priority; A then C FIFO among equals.
        assert_eq!(
            transport.sent(),
            vec![b"B".to_vec(), b"A".to_vec(), b"C".to_vec()]
        );
        token.cancel();
    }

    #[tokio::test]
    async fn transport_failure_settles_command_and_loop_survives() {
        let transport = Arc::new(MockTransport::connected());
        transport.push_reply(Reply::Err(TransportError::ReplyTimeout));
        let (queue, _bus, token) = harness(transport.clone());

        let (cmd, failing) = Command::new("BAD", b"BAD".to_vec(), 1);
        queue.admit(cmd).unwrap();
        assert_eq!(
            failing.outcome().await,
            Some(Err(TransportError::ReplyTimeout))
        );

        // Tag released; the same tag is admissible and executes fine.
        let (cmd, ok) = Command::new("BAD", b"BAD".to_vec(), 1);
        queue.admit(cmd).unwrap();
        assert_eq!(ok.outcome().await, Some(Ok(b"BAD".to_vec())));
        assert_eq!(queue.outstanding(), 0);
        token.cancel();
    }

    #[tokio::test]
    async fn parks_while_disconnected() {
        let transport = Arc::new(MockTransport::new()); // starts disconnected
        let (queue, _bus, token) = harness(transport.clone());

        let (cmd, completion) = Command::new("WAIT", b"WAIT".to_vec(), 1);
        queue.admit(cmd).unwrap();
        tokio::task::yield_now().await;
        assert!(transport.sent().is_empty());

        // Link comes up (as the supervisor would do) and the worker is woken.
        transport.connect().await.unwrap();
        queue.wake_worker();
        assert!(matches!(completion.outcome().await, Some(Ok(_))));
        token.cancel();
    }

    #[tokio::test]
    async fn cancellation_stops_an_idle_worker() {
        let transport = Arc::new(MockTransport::connected());
        let queue = Arc::new(CommandQueue::new(16));
        let bus = Bus::new(16);
        let token = CancellationToken::new();
        let worker = Worker {
            queue: queue.clone(),
            transport,
            bus,
        };
        let handle = tokio::spawn(worker.run(token.clone()));
        token.cancel();
        handle.await.unwrap();
    }
}
