//! The agent: a bridge connection feeding a tab sweeper.

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use shire_core::{PolicyStore, VerdictEngine};
use tokio::sync::{mpsc, watch};

use crate::backoff::ReconnectPolicy;
use crate::connection::{BridgeConnection, ConnectionState, HandshakeMode};
use crate::host::Host;
use crate::sweeper::{SweepConfig, TabSweeper};
use crate::transport::Connector;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub handshake: HandshakeMode,
    pub reconnect: ReconnectPolicy,
    pub sweep: SweepConfig,
}

pub struct Agent<C, H> {
    connection: BridgeConnection<C>,
    sweeper: Arc<TabSweeper<H>>,
    sweeps: mpsc::UnboundedReceiver<u64>,
}

impl<C, H> Agent<C, H>
where
    C: Connector,
    H: Host,
{
    pub fn new(connector: C, host: H, store: Arc<PolicyStore>, config: AgentConfig) -> Self {
        let (sweep_tx, sweeps) = mpsc::unbounded_channel();
        let connection = BridgeConnection::new(
            connector,
            Arc::clone(&store),
            sweep_tx,
            config.handshake,
            config.reconnect,
        );
        let sweeper = Arc::new(TabSweeper::new(host, VerdictEngine::new(store), config.sweep));

        Self {
            connection,
            sweeper,
            sweeps,
        }
    }

    /// The sweeper, for navigation events and document requests.
    pub fn sweeper(&self) -> Arc<TabSweeper<H>> {
        Arc::clone(&self.sweeper)
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Run until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Self {
            connection,
            sweeper,
            sweeps,
        } = self;

        tokio::select! {
            _ = connection.run_until(shutdown) => {}
            _ = sweep_loop(sweeper, sweeps) => {}
        }
    }
}

/// Sweep once per batch of policy updates. Triggers that queue up while a
/// sweep runs collapse into one, since every sweep reads the live policy.
async fn sweep_loop<H: Host>(sweeper: Arc<TabSweeper<H>>, mut sweeps: mpsc::UnboundedReceiver<u64>) {
    while let Some(mut generation) = sweeps.recv().await {
        while let Ok(newer) = sweeps.try_recv() {
            generation = newer;
        }
        log::debug!("Policy generation {generation} applied, sweeping documents");
        sweeper.resweep().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Document, DocumentId, HostError};
    use crate::messages::DocumentNotification;
    use crate::transport::{channel_transport, ChannelTransport};
    use async_trait::async_trait;
    use shire_bridge::{encode_state_update, BridgeError};
    use shire_core::{Block, BlockState, Policy};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    struct OnceConnector(Mutex<Option<ChannelTransport>>);

    #[async_trait]
    impl Connector for OnceConnector {
        type Transport = ChannelTransport;

        async fn connect(&self) -> Result<ChannelTransport, BridgeError> {
            self.0.lock().unwrap().take().ok_or(BridgeError::Closed)
        }
    }

    struct RecordingHost {
        documents: Vec<Document>,
        signals: mpsc::UnboundedSender<(DocumentId, DocumentNotification)>,
    }

    #[async_trait]
    impl Host for RecordingHost {
        async fn documents(&self) -> Result<Vec<Document>, HostError> {
            Ok(self.documents.clone())
        }

        async fn notify(&self, document: DocumentId, notification: &DocumentNotification) -> Result<(), HostError> {
            let _ = self.signals.send((document, notification.clone()));
            Ok(())
        }
    }

    #[test]
    fn test_config_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"handshake":"acknowledged"}"#).unwrap();
        assert_eq!(config.handshake, HandshakeMode::Acknowledged);
        assert_eq!(config.reconnect, ReconnectPolicy::default());
        assert_eq!(config.sweep, SweepConfig::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_update_sweeps_open_documents() {
        let (transport, mut peer) = channel_transport();
        let (signal_tx, mut signals) = mpsc::unbounded_channel();
        let host = RecordingHost {
            documents: vec![
                Document::new(1, "https://www.youtube.com/watch"),
                Document::new(2, "https://docs.rs"),
                Document::new(3, "about:blank"),
            ],
            signals: signal_tx,
        };
        let store = Arc::new(PolicyStore::new());
        let agent = Agent::new(
            OnceConnector(Mutex::new(Some(transport))),
            host,
            Arc::clone(&store),
            AgentConfig::default(),
        );
        let mut state = agent.subscribe();
        let sweeper = agent.sweeper();

        let (stop, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(agent.run_until(async move {
            let _ = stop_rx.await;
        }));

        state.wait_for(|s| *s == ConnectionState::Connected).await.unwrap();
        assert!(!sweeper.evaluate_one("https://youtube.com"));

        let policy = Policy::new().with_block(Block::new("video", BlockState::Locked).with_blacklist(["youtube.com"]));
        peer.frames.send(encode_state_update(&policy).unwrap()).unwrap();

        let (id, note) = signals.recv().await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(
            note,
            DocumentNotification::BlockPage {
                url: "https://www.youtube.com/watch".to_string()
            }
        );
        assert!(sweeper.evaluate_one("https://youtube.com"));
        assert_eq!(store.generation(), 1);

        let _ = stop.send(());
        task.await.unwrap();
        assert_eq!(*state.borrow_and_update(), ConnectionState::Disconnected);
        assert!(signals.try_recv().is_err());
    }
}
