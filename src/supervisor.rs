//! # Lifecycle supervisor: demand-driven connect, idle teardown, drain shutdown.
//!
//! [`LinkSupervisor`] ticks on a fixed period (independent of command arrival) and
//! drives the transport's lifecycle from two observations: the outstanding count
//! and the link state. It never touches `send_and_wait`; the worker never touches
//! `reconnect`/`close`. That split keeps the two schedules race-free.
//!
//! ## Tick order
//! ```text
//! every tick:
//!   1. cancelled && outstanding == 0
//!        → close link, stop worker, publish Terminated, stop ticking (absorbing)
//!   2. outstanding > 0 && !connected
//!        → reconnect (idempotent); on success wake the worker
//!   3. outstanding == 0 && connected
//!        → close (idle teardown: an open link with no work is a liability)
//! ```
//!
//! ## Phase machine
//! The supervisor derives a [`LinkPhase`] from (demand, link) after each tick and
//! publishes `PhaseChanged` on every transition. `Terminated` is absorbing and is
//! reached only from the idle phases once the cancel flag is set.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::dispatcher::CommandQueue;
use crate::events::{Bus, Event, EventKind};
use crate::transport::Transport;

/// Supervisor-observed state of one device, re-evaluated once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    /// Outstanding work and the link is up.
    ActiveConnected,
    /// Outstanding work but the link is down (reconnect pending).
    ActiveDisconnected,
    /// No work; link still up (will be torn down).
    IdleConnected,
    /// No work, no link. The resting state.
    IdleDisconnected,
    /// Drained and shut down. Absorbing.
    Terminated,
}

impl LinkPhase {
    fn observe(demand: bool, connected: bool) -> Self {
        match (demand, connected) {
            (true, true) => LinkPhase::ActiveConnected,
            (true, false) => LinkPhase::ActiveDisconnected,
            (false, true) => LinkPhase::IdleConnected,
            (false, false) => LinkPhase::IdleDisconnected,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LinkPhase::ActiveConnected => "active_connected",
            LinkPhase::ActiveDisconnected => "active_disconnected",
            LinkPhase::IdleConnected => "idle_connected",
            LinkPhase::IdleDisconnected => "idle_disconnected",
            LinkPhase::Terminated => "terminated",
        }
    }
}

/// Periodic lifecycle driver for one device.
pub(crate) struct LinkSupervisor {
    pub queue: Arc<CommandQueue>,
    pub transport: Arc<dyn Transport>,
    pub bus: Bus,
    pub tick: Duration,
    /// Cancelled by the supervisor at the terminal state to stop the worker.
    pub worker_token: CancellationToken,
    /// Cancelled at the terminal state; `Device::closed()` awaits it.
    pub terminated: CancellationToken,
}

impl LinkSupervisor {
    /// Ticks until the terminal state is reached or `runtime` is cancelled
    /// (device dropped).
    pub async fn run(self, runtime: CancellationToken) {
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut phase: Option<LinkPhase> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = runtime.cancelled() => return,
            }

            if self.queue.is_cancelled() && self.queue.outstanding() == 0 {
                self.transport.close().await;
                self.worker_token.cancel();
                self.transition(&mut phase, LinkPhase::Terminated);
                self.bus.publish(Event::now(EventKind::Terminated));
                self.terminated.cancel();
                return;
            }

            let outstanding = self.queue.outstanding();
            if outstanding > 0 && !self.transport.is_connected() {
                self.bus.publish(Event::now(EventKind::ReconnectRequested));
                match self.transport.reconnect().await {
                    Ok(()) => self.queue.wake_worker(),
                    Err(e) => self
                        .bus
                        .publish(Event::now(EventKind::ReconnectFailed).with_reason(e.to_string())),
                }
            } else if outstanding == 0 && self.transport.is_connected() {
                self.transport.close().await;
                self.bus.publish(Event::now(EventKind::LinkClosed));
            }

            let observed = LinkPhase::observe(
                self.queue.outstanding() > 0,
                self.transport.is_connected(),
            );
            self.transition(&mut phase, observed);
        }
    }

    fn transition(&self, current: &mut Option<LinkPhase>, next: LinkPhase) {
        if *current != Some(next) {
            *current = Some(next);
            self.bus
                .publish(Event::now(EventKind::PhaseChanged).with_phase(next));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::transport::mock::MockTransport;
    use tokio::sync::broadcast;

    const TICK: Duration = Duration::from_secs(2);

    struct Harness {
        queue: Arc<CommandQueue>,
        transport: Arc<MockTransport>,
        events: broadcast::Receiver<Event>,
        worker_token: CancellationToken,
        terminated: CancellationToken,
        runtime: CancellationToken,
    }

    fn spawn_supervisor(transport: Arc<MockTransport>) -> Harness {
        let queue = Arc::new(CommandQueue::new(16));
        let bus = Bus::new(64);
        let events = bus.subscribe();
        let worker_token = CancellationToken::new();
        let terminated = CancellationToken::new();
        let runtime = CancellationToken::new();

        let sup = LinkSupervisor {
            queue: queue.clone(),
            transport: transport.clone(),
            bus,
            tick: TICK,
            worker_token: worker_token.clone(),
            terminated: terminated.clone(),
        };
        tokio::spawn(sup.run(runtime.clone()));

        Harness {
            queue,
            transport,
            events,
            worker_token,
            terminated,
            runtime,
        }
    }

    async fn wait_for(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
        loop {
            let ev = rx.recv().await.expect("bus closed before expected event");
            if ev.kind == kind {
                return ev;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn idle_link_is_torn_down_within_one_period() {
        let mut h = spawn_supervisor(Arc::new(MockTransport::connected()));

        wait_for(&mut h.events, EventKind::LinkClosed).await;
        assert!(!h.transport.is_connected());
        assert_eq!(h.transport.calls(), vec!["close"]);
        h.runtime.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn demand_on_a_down_link_triggers_reconnect() {
        let mut h = spawn_supervisor(Arc::new(MockTransport::new()));

        let (cmd, _completion) = Command::new("PING", b"PING".to_vec(), 1);
        h.queue.admit(cmd).unwrap();

        wait_for(&mut h.events, EventKind::ReconnectRequested).await;
        // After a successful reconnect the link is up and the worker was woken.
        tokio::task::yield_now().await;
        assert!(h.transport.is_connected());
        assert!(h.transport.calls().contains(&"reconnect".to_string()));
        h.runtime.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reconnect_is_reported_and_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.set_fail_reconnect(true);
        let mut h = spawn_supervisor(transport);

        let (cmd, _completion) = Command::new("PING", b"PING".to_vec(), 1);
        h.queue.admit(cmd).unwrap();

        wait_for(&mut h.events, EventKind::ReconnectFailed).await;
        assert!(!h.transport.is_connected());

        // Next tick retries; let it succeed this time.
        h.transport.set_fail_reconnect(false);
        wait_for(&mut h.events, EventKind::ReconnectRequested).await;
        tokio::task::yield_now().await;
        assert!(h.transport.is_connected());
        h.runtime.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_with_drained_queue_terminates() {
        let mut h = spawn_supervisor(Arc::new(MockTransport::connected()));
        h.queue.cancel();

        wait_for(&mut h.events, EventKind::Terminated).await;
        assert!(h.worker_token.is_cancelled());
        assert!(h.terminated.is_cancelled());
        assert!(!h.transport.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_waits_for_outstanding_work() {
        let mut h = spawn_supervisor(Arc::new(MockTransport::connected()));

        let (cmd, _completion) = Command::new("SLOW", b"SLOW".to_vec(), 1);
        h.queue.admit(cmd).unwrap();
        h.queue.cancel();

        // With work still outstanding the supervisor must not terminate.
        tokio::time::sleep(TICK * 3).await;
        assert!(!h.terminated.is_cancelled());
        assert!(!h.worker_token.is_cancelled());

        // Simulate the worker finishing the command.
        let running = h.queue.pop().unwrap();
        h.queue.settle(&running.tag);

        wait_for(&mut h.events, EventKind::Terminated).await;
        assert!(h.terminated.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn phases_are_published_on_transitions() {
        let mut h = spawn_supervisor(Arc::new(MockTransport::new()));

        // First tick: no demand, no link.
        let ev = wait_for(&mut h.events, EventKind::PhaseChanged).await;
        assert_eq!(ev.phase, Some(LinkPhase::IdleDisconnected));

        // Demand appears; next tick reconnects and reports an active phase.
        let (cmd, _completion) = Command::new("GO", b"GO".to_vec(), 1);
        h.queue.admit(cmd).unwrap();
        let ev = wait_for(&mut h.events, EventKind::PhaseChanged).await;
        assert_eq!(ev.phase, Some(LinkPhase::ActiveConnected));
        h.runtime.cancel();
    }
}
