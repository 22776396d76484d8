//! # Device facade: the public entry point for one logical device.
//!
//! A [`Device`] composes the command queue, the single worker, the lifecycle
//! supervisor and the event bus over one caller-provided [`Transport`]. Build it
//! with [`Device::builder`]; submit work with [`Device::submit`]; shut it down
//! with [`Device::cancel`] and await [`Device::closed`].
//!
//! ## Wiring
//! ```text
//! callers ──► Device::submit ──► CommandQueue (admission + enqueue)
//!                                     │
//!                                     ▼
//!                             Worker (one task) ──► Transport::send_and_wait
//!                                     │
//!                                     ▼
//!                       Completion resolved, tag released
//!
//! LinkSupervisor (periodic) ──► reconnect / idle close / terminate
//! all components ──► Bus ──► SubscriberSet::forward ──► Subscribe* (one lane each)
//! ```
//!
//! ## Shutdown
//! `cancel()` sets a monotonic flag and returns immediately. Admission stops at
//! once; already-admitted commands drain to completion; the supervisor closes the
//! link and stops the worker on the first tick that observes zero outstanding
//! commands. Dropping the `Device` without cancelling stops the background tasks
//! without draining (queued completions resolve to `None`).

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::command::{Command, Completion};
use crate::config::DeviceConfig;
use crate::dispatcher::{CommandQueue, Worker};
use crate::error::ConfigError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::supervisor::LinkSupervisor;
use crate::transport::Transport;

/// Priority assigned by convention when a caller has no preference.
pub const DEFAULT_PRIORITY: i32 = 1;

/// Builder for constructing a [`Device`] with optional subscribers.
pub struct DeviceBuilder {
    config: DeviceConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl DeviceBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (admission, execution, lifecycle),
    /// each on its own bounded lane.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and spawns the runtime.
    ///
    /// Must be called within a tokio runtime. Returns [`ConfigError`] on invalid
    /// configuration; nothing is spawned in that case.
    pub fn build(self, transport: Arc<dyn Transport>) -> Result<Device, ConfigError> {
        self.config.validate()?;

        let bus = Bus::new(self.config.bus_capacity_clamped());
        let queue = Arc::new(CommandQueue::new(self.config.capacity));
        let runtime = CancellationToken::new();
        let worker_token = runtime.child_token();
        let terminated = CancellationToken::new();

        if !self.subscribers.is_empty() {
            SubscriberSet::new(self.subscribers).forward(bus.subscribe());
        }

        let worker = Worker {
            queue: queue.clone(),
            transport: transport.clone(),
            bus: bus.clone(),
        };
        tokio::spawn(worker.run(worker_token.clone()));

        let supervisor = LinkSupervisor {
            queue: queue.clone(),
            transport,
            bus: bus.clone(),
            tick: self.config.tick,
            worker_token,
            terminated: terminated.clone(),
        };
        tokio::spawn(supervisor.run(runtime.clone()));

        Ok(Device {
            queue,
            bus,
            runtime,
            terminated,
        })
    }
}

/// One logical device: exclusive, demand-driven access to a shared serial link.
pub struct Device {
    queue: Arc<CommandQueue>,
    bus: Bus,
    runtime: CancellationToken,
    terminated: CancellationToken,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device").finish_non_exhaustive()
    }
}

impl Device {
    /// Starts building a device with the given configuration.
    pub fn builder(config: DeviceConfig) -> DeviceBuilder {
        DeviceBuilder::new(config)
    }

    /// Submits a command for execution on the link.
    ///
    /// `tag` identifies the command for deduplication: while a command with the
    /// same tag is outstanding, further submissions are dropped. Higher `priority`
    /// executes first; equal priorities execute in submission order.
    ///
    /// Never fails and never blocks on the transport. Admission rejection (queue
    /// full, duplicate or empty tag, device cancelled) is reported only through a
    /// `CommandRejected` bus event and through the returned [`Completion`]
    /// resolving to `None`.
    pub fn submit(
        &self,
        tag: impl Into<Arc<str>>,
        payload: Vec<u8>,
        priority: i32,
    ) -> Completion {
        let (cmd, completion) = Command::new(tag, payload, priority);
        let tag = cmd.tag.clone();
        // The admission event's seq is allocated before admit() can wake the
        // worker, so CommandStarted never sorts ahead of its own admission.
        let admitted = Event::now(EventKind::CommandAdmitted).with_tag(tag.clone());
        match self.queue.admit(cmd) {
            Ok(()) => self.bus.publish(admitted),
            Err(reason) => self.bus.publish(
                Event::now(EventKind::CommandRejected)
                    .with_tag(tag)
                    .with_reason(reason.as_label()),
            ),
        }
        completion
    }

    /// Begins graceful drain-and-shutdown. Non-blocking, idempotent.
    ///
    /// New submissions are rejected from this point on; commands already admitted
    /// run to completion. The terminal state is reached on the first supervisor
    /// tick that observes an empty queue — await it with [`Device::closed`].
    pub fn cancel(&self) {
        if self.queue.cancel() {
            self.bus.publish(Event::now(EventKind::ShutdownRequested));
        }
    }

    /// Resolves once the device has drained, closed the link and stopped.
    pub async fn closed(&self) {
        self.terminated.cancelled().await;
    }

    /// Number of outstanding commands (enqueued + executing).
    pub fn outstanding(&self) -> usize {
        self.queue.outstanding()
    }

    /// Subscribes to runtime events.
    ///
    /// The receiver observes only events published after this call; slow
    /// receivers may observe `Lagged`.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.runtime.cancel();
    }
}
