//! # Transport boundary.
//!
//! [`Transport`] abstracts the raw point-to-point link (Bluetooth serial, UART,
//! TCP bridge, ...). Implementations live outside this crate; the runtime only
//! assumes the contract below.
//!
//! ## Contract
//! - `send_and_wait` carries **one in-flight exchange at a time**. The dispatcher
//!   enforces this by funnelling all sends through a single worker task; the
//!   transport does not need its own serialization.
//! - `reconnect` is idempotent: calling it while connected or while a connect is
//!   already in progress must be harmless.
//! - `close` is infallible from the runtime's point of view; a transport that can
//!   fail to close should log and swallow internally.
//! - `is_connected` must be cheap and safe to call concurrently with `send_and_wait`
//!   (the supervisor polls it every tick while the worker may be mid-exchange).

use async_trait::async_trait;

use crate::error::TransportError;

/// Byte-level connection over one physical link.
///
/// Consumed by the device runtime, implemented externally. Payloads and replies are
/// opaque byte vectors; framing and device protocol are the implementor's business.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Opens the connection.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Reports the current link state.
    fn is_connected(&self) -> bool;

    /// Re-establishes the connection. Idempotent.
    async fn reconnect(&self) -> Result<(), TransportError>;

    /// Tears the connection down.
    async fn close(&self);

    /// Sends `payload` and blocks (asynchronously) until the device replies.
    ///
    /// Bounded by the transport's own timeout; on expiry return
    /// [`TransportError::ReplyTimeout`].
    async fn send_and_wait(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted in-memory transport for runtime tests.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::TransportError;

    use super::Transport;

    /// What the mock should answer to the next `send_and_wait`.
    pub enum Reply {
        /// Return these exact bytes.
        Bytes(Vec<u8>),
        /// Fail the exchange.
        Err(TransportError),
    }

    /// In-memory [`Transport`] that records every call and serves scripted replies.
    ///
    /// Defaults: disconnected, echoes payloads, reconnect succeeds.
    pub struct MockTransport {
        connected: AtomicBool,
        fail_reconnect: AtomicBool,
        state: Mutex<State>,
    }

    struct State {
        replies: VecDeque<Reply>,
        calls: Vec<String>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                connected: AtomicBool::new(false),
                fail_reconnect: AtomicBool::new(false),
                state: Mutex::new(State {
                    replies: VecDeque::new(),
                    calls: Vec::new(),
                }),
            }
        }

        pub fn connected() -> Self {
            let t = Self::new();
            t.connected.store(true, Ordering::SeqCst);
            t
        }

        /// Queues a scripted reply; once the script is exhausted the mock echoes.
        pub fn push_reply(&self, reply: Reply) {
            self.state.lock().unwrap().replies.push_back(reply);
        }

        pub fn set_fail_reconnect(&self, fail: bool) {
            self.fail_reconnect.store(fail, Ordering::SeqCst);
        }

        /// Call log: `connect`, `reconnect`, `close`, `send:<payload-utf8>`.
        pub fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }

        /// Payloads sent so far, in order.
        pub fn sent(&self) -> Vec<Vec<u8>> {
            self.state
                .lock()
                .unwrap()
                .calls
                .iter()
                .filter_map(|c| c.strip_prefix("send:").map(|p| p.as_bytes().to_vec()))
                .collect()
        }

        fn record(&self, call: impl Into<String>) {
            self.state.lock().unwrap().calls.push(call.into());
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn connect(&self) -> Result<(), TransportError> {
            self.record("connect");
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn reconnect(&self) -> Result<(), TransportError> {
            self.record("reconnect");
            if self.fail_reconnect.load(Ordering::SeqCst) {
                return Err(TransportError::ConnectionFailed("scripted".into()));
            }
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn close(&self) {
            self.record("close");
            self.connected.store(false, Ordering::SeqCst);
        }

        async fn send_and_wait(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
            self.record(format!("send:{}", String::from_utf8_lossy(payload)));
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }
            let scripted = self.state.lock().unwrap().replies.pop_front();
            match scripted {
                None => Ok(payload.to_vec()),
                Some(Reply::Bytes(b)) => Ok(b),
                Some(Reply::Err(e)) => Err(e),
            }
        }
    }
}
