//! # SubscriberSet: the fan-out stage between the event bus and subscribers.
//!
//! One **lane** per subscriber — a bounded mpsc queue drained by a dedicated
//! task. [`SubscriberSet::forward`] plugs the whole set into a bus receiver and
//! pumps it until the bus closes, which is how the device wires observability up.
//!
//! ## Rules
//! - Handing out an event never waits on a subscriber: a full lane sheds the
//!   event for that subscriber only (reported with a `lane_full` label).
//! - A panic inside `on_event` is caught; the lane keeps draining.
//! - No ordering across different subscribers; `Event::seq` restores it.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::events::Event;

use super::Subscribe;

/// Why an event was shed instead of queued on a lane.
enum Shed {
    /// The lane is at its subscriber's capacity bound.
    LaneFull,
    /// The lane's drain task is gone.
    LaneGone,
}

impl Shed {
    fn as_label(&self) -> &'static str {
        match self {
            Shed::LaneFull => "lane_full",
            Shed::LaneGone => "lane_gone",
        }
    }
}

struct Lane {
    name: &'static str,
    feed: mpsc::Sender<Arc<Event>>,
}

/// Fan-out over a set of subscribers, one bounded lane each.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    drains: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Opens one lane per subscriber and spawns its drain task.
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut lanes = Vec::with_capacity(subscribers.len());
        let mut drains = Vec::with_capacity(subscribers.len());

        for sub in subscribers {
            let name = sub.name();
            let (feed, mut rx) = mpsc::channel::<Arc<Event>>(sub.lane_capacity().max(1));

            drains.push(tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let handled = std::panic::AssertUnwindSafe(sub.on_event(ev.as_ref()))
                        .catch_unwind()
                        .await;
                    if handled.is_err() {
                        eprintln!(
                            "[linkmux] subscriber '{}' panicked on event seq={}",
                            sub.name(),
                            ev.seq
                        );
                    }
                }
            }));
            lanes.push(Lane { name, feed });
        }

        Self { lanes, drains }
    }

    /// Hands one event to every lane without waiting.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for lane in &self.lanes {
            let shed = match lane.feed.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => Shed::LaneFull,
                Err(mpsc::error::TrySendError::Closed(_)) => Shed::LaneGone,
            };
            eprintln!(
                "[linkmux] subscriber '{}' shed event seq={}: {}",
                lane.name,
                ev.seq,
                shed.as_label()
            );
        }
    }

    /// Consumes the set and pumps a bus receiver into it until the bus closes.
    ///
    /// Lag on the receiver means the bus already discarded those events; the
    /// pump skips ahead rather than stopping. Once every bus sender is gone the
    /// lanes are closed and their drains awaited.
    pub fn forward(self, mut events: broadcast::Receiver<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ev) => self.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            self.close().await;
        })
    }

    /// Closes every lane and waits for the drain tasks to finish.
    pub async fn close(self) {
        drop(self.lanes);
        for drain in self.drains {
            let _ = drain.await;
        }
    }
}
