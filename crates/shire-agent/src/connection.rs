//! Bridge Connection
//!
//! State machine for the link to the policy daemon:
//!
//! ```text
//! Disconnected --connect()-------------> Connecting
//! Connecting   --transport open---------> Connected     (Optimistic)
//! Connecting   --{"type":"connected"}---> Connected     (Acknowledged)
//! Connected    --transport drop---------> Disconnected
//! Disconnected --reconnect timer--------> Connecting
//! ```
//!
//! Retries never stop. Malformed frames are logged and dropped without
//! touching the connection state or the policy.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shire_bridge::{InboundFrame, OutboundFrame};
use shire_core::PolicyStore;
use tokio::sync::{mpsc, watch};

use crate::backoff::{Backoff, ReconnectPolicy};
use crate::transport::{Connector, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// When a freshly opened transport counts as connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandshakeMode {
    /// As soon as the transport is open and the ping is sent.
    #[default]
    Optimistic,
    /// Only once the daemon sends `{"type":"connected"}`.
    Acknowledged,
}

pub struct BridgeConnection<C> {
    connector: C,
    store: Arc<PolicyStore>,
    /// Receives the generation of every applied policy.
    sweeps: mpsc::UnboundedSender<u64>,
    state: watch::Sender<ConnectionState>,
    handshake: HandshakeMode,
    backoff: Backoff,
}

impl<C: Connector> BridgeConnection<C> {
    pub fn new(
        connector: C,
        store: Arc<PolicyStore>,
        sweeps: mpsc::UnboundedSender<u64>,
        handshake: HandshakeMode,
        reconnect: ReconnectPolicy,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            connector,
            store,
            sweeps,
            state,
            handshake,
            backoff: Backoff::new(reconnect),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Connect, and keep reconnecting, until `shutdown` resolves.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => log::info!("Bridge connection shutting down"),
            _ = self.run_forever() => {}
        }
        self.set_state(ConnectionState::Disconnected);
    }

    async fn run_forever(&mut self) {
        loop {
            self.session().await;
            self.set_state(ConnectionState::Disconnected);

            let delay = self.backoff.next_delay();
            log::info!("Reconnecting to bridge in {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    /// One connection attempt, returning when the transport drops.
    async fn session(&mut self) {
        self.set_state(ConnectionState::Connecting);

        let mut transport = match self.connector.connect().await {
            Ok(transport) => transport,
            Err(e) => {
                log::warn!("Failed to connect to bridge: {e}");
                return;
            }
        };

        if let Err(e) = transport.send(OutboundFrame::Ping).await {
            log::warn!("Failed to send ping to bridge: {e}");
            return;
        }

        if self.handshake == HandshakeMode::Optimistic {
            self.enter_connected();
        }

        loop {
            match transport.recv().await {
                Ok(Some(raw)) => self.dispatch(&raw),
                Ok(None) => {
                    log::warn!("Bridge closed the connection");
                    return;
                }
                Err(e) => {
                    log::warn!("Bridge transport failed: {e}");
                    return;
                }
            }
        }
    }

    fn dispatch(&mut self, raw: &[u8]) {
        let frame = match InboundFrame::decode(raw) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Dropping malformed bridge frame: {e}");
                return;
            }
        };

        match frame {
            InboundFrame::StateUpdate(policy) => {
                let snapshot = self.store.apply(policy);
                // The agent may run without a sweeper.
                let _ = self.sweeps.send(snapshot.generation());
            }
            InboundFrame::Connected => self.enter_connected(),
            InboundFrame::Disconnected => self.set_state(ConnectionState::Disconnected),
            InboundFrame::Unknown(frame_type) => {
                log::debug!("Ignoring bridge frame of type {frame_type:?}");
            }
        }
    }

    fn enter_connected(&mut self) {
        self.backoff.reset();
        self.set_state(ConnectionState::Connected);
    }

    fn set_state(&self, next: ConnectionState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            log::info!("Bridge {prev:?} -> {next:?}");
        }
    }
}
