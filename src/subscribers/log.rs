//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [admitted] tag=PING
//! [rejected] tag=PING reason=duplicate_tag
//! [started] tag=PING
//! [completed] tag=PING
//! [failed] tag=PING reason="reply timed out"
//! [reconnect-requested]
//! [link-closed]
//! [phase] active_connected
//! [terminated]
//! ```
//!
//! Not intended for production use — implement a custom
//! [`Subscribe`](crate::Subscribe) for structured logging or metrics.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Stdout logging subscriber, enabled via the `logging` feature.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::CommandAdmitted => {
                println!("[admitted] tag={:?}", e.tag);
            }
            EventKind::CommandRejected => {
                println!("[rejected] tag={:?} reason={:?}", e.tag, e.reason);
            }
            EventKind::CommandStarted => {
                println!("[started] tag={:?}", e.tag);
            }
            EventKind::CommandCompleted => {
                println!("[completed] tag={:?}", e.tag);
            }
            EventKind::CommandFailed => {
                println!("[failed] tag={:?} reason={:?}", e.tag, e.reason);
            }
            EventKind::ReconnectRequested => {
                println!("[reconnect-requested]");
            }
            EventKind::ReconnectFailed => {
                println!("[reconnect-failed] reason={:?}", e.reason);
            }
            EventKind::LinkClosed => {
                println!("[link-closed]");
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::PhaseChanged => {
                if let Some(phase) = e.phase {
                    println!("[phase] {}", phase.as_label());
                }
            }
            EventKind::Terminated => {
                println!("[terminated]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
