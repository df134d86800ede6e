//! WebSocket connection manager.
//!
//! Owns at most one logical connection to the remote event source and
//! normalizes inbound frames into [`EventEnvelope`]s, regardless of
//! transport hiccups. Transport failures never reach callers as errors;
//! they surface as notifications on the synthetic `connection` category
//! while the manager retries with bounded linear backoff.
//!
//! # State machine
//!
//! ```text
//! connecting ──open──► connected ──close/drop──► disconnected
//!     ▲                                               │
//!     └────────── retry (attempt × base delay) ───────┘
//!                  at most max_attempts, counter
//!                  reset by each successful open
//! ```
//!
//! `error` is an orthogonal notification fired alongside a transport
//! failure, not a sink state. `disconnected` is terminal only after the
//! retry budget is spent or an explicit [`ConnectionManager::disconnect`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::adapters::registry::SubscriberRegistry;
use crate::domain::{
    ConnectionNotice, ConnectionState, EventCategory, EventEnvelope, FeedEvent, SubscriptionId,
};
use crate::ports::EventHandler;

use super::messages::{ClientMessage, SendOutcome};

/// Reconnection behavior for a manager instance.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Consecutive failures tolerated before the manager gives up.
    pub max_attempts: u32,

    /// Delay unit: the nth consecutive failure waits `n × base_delay`.
    ///
    /// Linear, not exponential, matching the feed server's reconnect
    /// contract.
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl ReconnectPolicy {
    fn delay_for(&self, failures: u32) -> Duration {
        self.base_delay * failures
    }
}

/// Snapshot of the manager's drop/receive counters.
///
/// Malformed frames and sends-while-disconnected are dropped by policy;
/// these counters make the drops observable instead of silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedStats {
    /// Well-formed envelopes delivered to the registry.
    pub messages_received: u64,
    /// Inbound frames discarded for failing JSON or shape parsing.
    pub malformed_dropped: u64,
    /// Outbound messages discarded because the connection was not open.
    pub sends_dropped: u64,
}

#[derive(Default)]
struct Counters {
    messages_received: AtomicU64,
    malformed_dropped: AtomicU64,
    sends_dropped: AtomicU64,
}

struct Shared {
    state: RwLock<ConnectionState>,
    counters: Counters,
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        *self
            .state
            .write()
            .expect("ConnectionManager: state lock poisoned") = state;
    }

    fn state(&self) -> ConnectionState {
        *self
            .state
            .read()
            .expect("ConnectionManager: state lock poisoned")
    }
}

/// Manages one logical connection to the remote event source.
///
/// Construction begins connecting immediately; there is no separate start
/// call. Lifetime is caller-managed: pair every construction with a
/// [`disconnect`](Self::disconnect), or the driver task keeps retrying in
/// the background for as long as its budget allows.
pub struct ConnectionManager {
    registry: Arc<SubscriberRegistry>,
    shared: Arc<Shared>,
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl ConnectionManager {
    /// Starts connecting to `address` with the default reconnect policy.
    pub fn connect(address: impl Into<String>) -> Self {
        Self::with_policy(address, ReconnectPolicy::default())
    }

    /// Starts connecting to `address` with an explicit reconnect policy.
    pub fn with_policy(address: impl Into<String>, policy: ReconnectPolicy) -> Self {
        let registry = Arc::new(SubscriberRegistry::new());
        let shared = Arc::new(Shared {
            state: RwLock::new(ConnectionState::Connecting),
            counters: Counters::default(),
        });
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let driver = Driver {
            address: address.into(),
            policy,
            registry: registry.clone(),
            shared: shared.clone(),
            cancel: cancel.clone(),
            outbound: outbound_rx,
        };
        tokio::spawn(driver.run());

        Self {
            registry,
            shared,
            outbound: outbound_tx,
            cancel,
        }
    }

    /// Registers a handler for one category, including the synthetic
    /// `connection` category used for state notifications.
    pub fn on(&self, category: EventCategory, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        self.registry.subscribe(category, handler)
    }

    /// Removes a registration made with [`on`](Self::on).
    pub fn off(&self, category: EventCategory, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(category, id)
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Snapshot of the receive/drop counters.
    pub fn stats(&self) -> FeedStats {
        FeedStats {
            messages_received: self.shared.counters.messages_received.load(Ordering::Relaxed),
            malformed_dropped: self.shared.counters.malformed_dropped.load(Ordering::Relaxed),
            sends_dropped: self.shared.counters.sends_dropped.load(Ordering::Relaxed),
        }
    }

    /// Transmits a message if and only if the connection is currently open.
    ///
    /// Anything else is dropped: no queuing, no error. Outbound traffic is
    /// limited to non-critical pings, so best-effort is the contract.
    pub fn send(&self, message: &ClientMessage) -> SendOutcome {
        if self.state() != ConnectionState::Connected {
            self.shared
                .counters
                .sends_dropped
                .fetch_add(1, Ordering::Relaxed);
            tracing::debug!("dropping outbound message while not connected");
            return SendOutcome::DroppedDisconnected;
        }

        let text = serde_json::to_string(message)
            .expect("client message serialization should never fail");
        match self.outbound.send(text) {
            Ok(()) => SendOutcome::Sent,
            Err(_) => {
                self.shared
                    .counters
                    .sends_dropped
                    .fetch_add(1, Ordering::Relaxed);
                SendOutcome::DroppedDisconnected
            }
        }
    }

    /// Sends a heartbeat ping (best-effort, like every send).
    pub fn send_ping(&self) -> SendOutcome {
        self.send(&ClientMessage::ping())
    }

    /// Closes the channel and stops all reconnection. Idempotent.
    ///
    /// The instance is spent afterwards; construct a new manager to
    /// connect again.
    pub fn disconnect(&self) {
        self.cancel.cancel();
    }
}

enum SessionEnd {
    /// Server closed the stream or the socket ended cleanly.
    Closed,
    /// The transport reported an error mid-session.
    Failed(String),
    /// The caller disconnected.
    Cancelled,
}

struct Driver {
    address: String,
    policy: ReconnectPolicy,
    registry: Arc<SubscriberRegistry>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    outbound: mpsc::UnboundedReceiver<String>,
}

impl Driver {
    async fn run(mut self) {
        let mut failures: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                self.transition(ConnectionState::Disconnected, failures, None)
                    .await;
                return;
            }

            self.transition(ConnectionState::Connecting, failures, None)
                .await;

            let connected = tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.transition(ConnectionState::Disconnected, failures, None).await;
                    return;
                }
                result = connect_async(self.address.as_str()) => result,
            };

            match connected {
                Ok((stream, _response)) => {
                    failures = 0;
                    tracing::info!(address = %self.address, "feed connection established");
                    self.transition(ConnectionState::Connected, 0, None).await;

                    match self.run_session(stream).await {
                        SessionEnd::Cancelled => {
                            self.transition(
                                ConnectionState::Disconnected,
                                0,
                                Some("disconnected by caller".to_string()),
                            )
                            .await;
                            return;
                        }
                        SessionEnd::Failed(reason) => {
                            failures += 1;
                            self.transition(ConnectionState::Error, failures, Some(reason))
                                .await;
                            self.transition(ConnectionState::Disconnected, failures, None)
                                .await;
                        }
                        SessionEnd::Closed => {
                            failures += 1;
                            self.transition(
                                ConnectionState::Disconnected,
                                failures,
                                Some("server closed the connection".to_string()),
                            )
                            .await;
                        }
                    }
                }
                Err(error) => {
                    failures += 1;
                    self.transition(ConnectionState::Error, failures, Some(error.to_string()))
                        .await;
                    self.transition(ConnectionState::Disconnected, failures, None)
                        .await;
                }
            }

            if failures >= self.policy.max_attempts {
                tracing::info!(
                    attempts = failures,
                    address = %self.address,
                    "reconnect budget exhausted, feed stays disconnected"
                );
                return;
            }

            let delay = self.policy.delay_for(failures);
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.transition(ConnectionState::Disconnected, failures, None).await;
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn run_session(
        &mut self,
        stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ) -> SessionEnd {
        let (mut sink, mut source) = stream.split();
        let mut outbound_open = true;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    // Best-effort close frame; the connection is going away
                    // either way.
                    let _ = sink.send(Message::Close(None)).await;
                    return SessionEnd::Cancelled;
                }
                outgoing = self.outbound.recv(), if outbound_open => {
                    match outgoing {
                        Some(text) => {
                            if let Err(error) = sink.send(Message::Text(text)).await {
                                return SessionEnd::Failed(format!("write failed: {error}"));
                            }
                        }
                        None => outbound_open = false,
                    }
                }
                incoming = source.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => self.handle_inbound(&text).await,
                        Some(Ok(Message::Close(_))) | None => return SessionEnd::Closed,
                        // Pings are answered by the protocol layer; binary
                        // frames are not part of the feed protocol.
                        Some(Ok(_)) => {}
                        Some(Err(error)) => return SessionEnd::Failed(error.to_string()),
                    }
                }
            }
        }
    }

    async fn handle_inbound(&self, raw: &str) {
        match EventEnvelope::from_wire(raw) {
            Ok(envelope) => {
                self.shared
                    .counters
                    .messages_received
                    .fetch_add(1, Ordering::Relaxed);
                self.registry.dispatch(&envelope).await;
            }
            Err(error) => {
                self.shared
                    .counters
                    .malformed_dropped
                    .fetch_add(1, Ordering::Relaxed);
                tracing::warn!(%error, "dropping malformed inbound frame");
            }
        }
    }

    async fn transition(&self, state: ConnectionState, attempt: u32, reason: Option<String>) {
        self.shared.set_state(state);
        tracing::debug!(?state, attempt, "connection state change");

        let notice = ConnectionNotice {
            state,
            attempt,
            reason,
        };
        self.registry.dispatch(&notice.to_envelope()).await;
    }
}
