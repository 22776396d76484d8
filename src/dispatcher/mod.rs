//! Dispatcher: bounded, deduplicating, priority-ordered queue + single worker.
//!
//! Internal modules:
//! - [`admission`]: per-command admission outcome ([`RejectReason`])
//! - [`queue`]: synchronized queue state (heap + tag set + outstanding counter)
//! - [`worker`]: the single sequential consumer draining the queue against the
//!   transport
//!
//! The only public API from this module is [`RejectReason`]; the queue and worker
//! are wired internally by the [`Device`](crate::Device) facade.

mod admission;
mod queue;
mod worker;

pub use admission::RejectReason;

pub(crate) use queue::CommandQueue;
pub(crate) use worker::Worker;
