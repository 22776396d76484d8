//! # Synchronized command queue.
//!
//! [`CommandQueue`] owns the only cross-thread mutable state of the dispatcher:
//!
//! - a binary heap ordered by (priority desc, arrival seq asc),
//! - the outstanding-tag set (dedup, covers enqueued **and** executing commands),
//! - the outstanding counter (atomic, readable lock-free by the supervisor),
//! - the cancel flag (monotonic false→true),
//! - a [`Notify`] used to wake the single worker.
//!
//! ## Invariants
//! - A tag appears at most once in the set.
//! - The atomic counter equals the set's cardinality at every instant observable
//!   outside the mutex.
//! - The counter never exceeds capacity and never goes negative: only a
//!   successful tag removal decrements (a double settle is a no-op), and the
//!   decrement clamps at zero.
//! - Heap, set and counter are mutated as one atomic unit under a single mutex;
//!   submit-side critical sections are short (no transport work under the lock).
//!
//! ## Ordering
//! Higher priority dequeues first; equal priorities dequeue FIFO by a
//! monotonically increasing arrival sequence number, never by incidental heap
//! structure. Arrival order must be preserved to avoid starvation.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use tokio::sync::futures::Notified;
use tokio::sync::Notify;

use crate::command::Command;

use super::admission::RejectReason;

/// Heap entry: command plus its ordering key.
struct Entry {
    priority: i32,
    seq: u64,
    cmd: Command,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Max-heap: greatest entry pops first. Priority wins; among equal
    // priorities the *older* arrival (smaller seq) is greater.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Inner {
    heap: BinaryHeap<Entry>,
    tags: HashSet<Arc<str>>,
    next_seq: u64,
}

/// Bounded, deduplicating, priority-ordered queue shared between submit callers
/// (many) and the worker (one).
pub(crate) struct CommandQueue {
    capacity: usize,
    outstanding: AtomicUsize,
    cancelled: AtomicBool,
    inner: Mutex<Inner>,
    notify: Notify,
}

impl CommandQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            outstanding: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                tags: HashSet::new(),
                next_seq: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// Admission check + enqueue as one atomic unit.
    ///
    /// On rejection the command is dropped here, which drops its completion
    /// sender; the caller's [`Completion`](crate::Completion) resolves to `None`.
    pub fn admit(&self, cmd: Command) -> Result<(), RejectReason> {
        if self.cancelled.load(AtomicOrdering::SeqCst) {
            return Err(RejectReason::ShuttingDown);
        }
        if cmd.tag.trim().is_empty() {
            return Err(RejectReason::EmptyTag);
        }

        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        if inner.tags.len() >= self.capacity {
            return Err(RejectReason::QueueFull);
        }
        if inner.tags.contains(&cmd.tag) {
            return Err(RejectReason::DuplicateTag);
        }

        inner.tags.insert(cmd.tag.clone());
        self.outstanding
            .store(inner.tags.len(), AtomicOrdering::SeqCst);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(Entry {
            priority: cmd.priority,
            seq,
            cmd,
        });
        drop(inner);

        self.notify.notify_one();
        Ok(())
    }

    /// Takes the highest-priority command. Its tag stays outstanding until
    /// [`settle`](Self::settle) — an identical submission while the command is
    /// executing is still a duplicate.
    pub fn pop(&self) -> Option<Command> {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        inner.heap.pop().map(|e| e.cmd)
    }

    /// Releases a finished command's tag and decrements the counter.
    ///
    /// Settling a tag that is not outstanding (double settle, unknown tag) is a
    /// no-op: the counter only moves when the tag actually leaves the set, which
    /// keeps it equal to the set's cardinality. The decrement itself saturates at
    /// zero; a negative count must never be observable.
    pub fn settle(&self, tag: &Arc<str>) {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        if inner.tags.remove(tag) {
            let _ = self
                .outstanding
                .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| {
                    Some(n.saturating_sub(1))
                });
        }
    }

    /// Lock-free outstanding count (enqueued + executing).
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(AtomicOrdering::SeqCst)
    }

    /// Sets the cancel flag. Returns `true` on the false→true transition.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, AtomicOrdering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::SeqCst)
    }

    /// Wakes the worker (new work, or link became ready).
    pub fn wake_worker(&self) {
        self.notify.notify_one();
    }

    /// Future resolving on the next wakeup. Create it **before** re-checking the
    /// queue to avoid missed notifications.
    pub fn notified(&self) -> Notified<'_> {
        self.notify.notified()
    }
}
