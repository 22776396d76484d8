//! # linkmux
//!
//! **Linkmux** serializes access to a single point-to-point serial link.
//!
//! It provides a bounded, deduplicating, priority-ordered command queue drained
//! by exactly one worker task, plus a periodic supervisor that connects the link
//! on demand, tears it down when idle, and drains it on shutdown. The crate is
//! designed as a building block for device drivers that talk request/reply over
//! Bluetooth serial, UART, or similar half-duplex transports.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   submit()   │   │   submit()   │   │   submit()   │
//!     │  (caller #1) │   │  (caller #2) │   │  (caller #3) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Device (facade)                                                  │
//! │  - admission gate (capacity / empty tag / duplicate / cancelled)  │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────────────┬──────────────────────────────────┬─────────────────┘
//!                ▼                                  ▼
//!     ┌────────────────────┐           ┌──────────────────────────┐
//!     │    CommandQueue    │           │      LinkSupervisor      │
//!     │ (priority + FIFO,  │◄──ticks───┤  - reconnect on demand   │
//!     │  dedup by tag)     │           │  - close when idle       │
//!     └─────────┬──────────┘           │  - terminate when drained│
//!               ▼                      └────────────┬─────────────┘
//!     ┌────────────────────┐                        │
//!     │  Worker (one task) │◄───wake on reconnect───┘
//!     │  pop → send_and_   │
//!     │  wait → resolve    │
//!     └─────────┬──────────┘
//!               ▼
//!     ┌────────────────────┐
//!     │  Transport (yours) │
//!     └────────────────────┘
//! ```
//!
//! ### Command lifecycle
//! ```text
//! submit(tag, payload, priority)
//!   ├─► admission (synchronous, never blocks on the transport):
//!   │     ├─ device cancelled   ─► drop, CommandRejected(shutting_down)
//!   │     ├─ tag empty/blank    ─► drop, CommandRejected(empty_tag)
//!   │     ├─ queue at capacity  ─► drop, CommandRejected(queue_full)
//!   │     ├─ tag outstanding    ─► drop, CommandRejected(duplicate_tag)
//!   │     └─ otherwise          ─► enqueue, CommandAdmitted
//!   │
//!   └─► worker (only while the link is up):
//!         ├─► pop highest priority (ties: oldest first)
//!         ├─► publish CommandStarted
//!         ├─► Transport::send_and_wait(payload)
//!         │     ├─ Ok(reply) ─► CommandCompleted
//!         │     └─ Err(e)    ─► CommandFailed (command-local; loop survives)
//!         ├─► resolve the caller's Completion
//!         └─► release the tag (duplicates admissible again)
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                |
//! |-------------------|-----------------------------------------------------------------|-----------------------------------|
//! | **Facade**        | Submit, cancel, observe one device.                             | [`Device`], [`DeviceBuilder`]     |
//! | **Completion**    | One-shot per-command outcome handles.                           | [`Completion`], [`CommandResult`] |
//! | **Transport**     | The link contract you implement.                                | [`Transport`]                     |
//! | **Lifecycle**     | Supervisor-observed link phases.                                | [`LinkPhase`]                     |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, custom subscribers).| [`Subscribe`], [`Event`]          |
//! | **Errors**        | Typed errors for configuration and the transport boundary.     | [`ConfigError`], [`TransportError`] |
//! | **Configuration** | Centralize device settings.                                     | [`DeviceConfig`]                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use linkmux::{Device, DeviceConfig, Transport};
//!
//! # fn open_transport() -> Arc<dyn Transport> { unimplemented!() }
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = DeviceConfig::default();
//!     cfg.tick = Duration::from_secs(2);
//!
//!     let transport: Arc<dyn Transport> = open_transport();
//!     let device = Device::builder(cfg).build(transport)?;
//!
//!     // Fire-and-observe: the reply (or transport error) arrives on the handle.
//!     let completion = device.submit("STATUS", b"S?".to_vec(), linkmux::DEFAULT_PRIORITY);
//!     match completion.outcome().await {
//!         Some(Ok(reply)) => println!("reply: {reply:?}"),
//!         Some(Err(e)) => eprintln!("exchange failed: {e}"),
//!         None => eprintln!("dropped at admission"),
//!     }
//!
//!     // Graceful shutdown: drain, close the link, stop.
//!     device.cancel();
//!     device.closed().await;
//!     Ok(())
//! }
//! ```
mod command;
mod config;
mod device;
mod dispatcher;
mod error;
mod events;
mod subscribers;
mod supervisor;
mod transport;

// ---- Public re-exports ----

pub use command::{CommandResult, Completion};
pub use config::DeviceConfig;
pub use device::{Device, DeviceBuilder, DEFAULT_PRIORITY};
pub use dispatcher::RejectReason;
pub use error::{ConfigError, TransportError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use supervisor::LinkPhase;
pub use transport::Transport;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
