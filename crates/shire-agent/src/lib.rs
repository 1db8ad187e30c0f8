//! Shire Agent
//!
//! Keeps the local policy in sync with the Shire daemon and enforces it on
//! open documents:
//!
//! - [`BridgeConnection`]: connect, handshake, reconnect forever, apply
//!   every `state_update` to the shared [`shire_core::PolicyStore`]
//! - [`TabSweeper`]: re-evaluate open documents after each update and answer
//!   `checkBlocked` requests
//! - [`Agent`]: both of the above wired together
//!
//! The host environment is abstracted behind [`Host`] and the daemon link
//! behind [`Connector`] / [`Transport`].

pub mod agent;
pub mod backoff;
pub mod connection;
pub mod host;
pub mod messages;
pub mod sweeper;
pub mod transport;

pub use agent::{Agent, AgentConfig};
pub use backoff::{Backoff, ReconnectPolicy};
pub use connection::{BridgeConnection, ConnectionState, HandshakeMode};
pub use host::{Document, DocumentId, Host, HostError};
pub use messages::{CheckBlockedResponse, DocumentNotification, HostRequest};
pub use sweeper::{SweepConfig, SweepReport, TabSweeper};
pub use transport::{channel_transport, ChannelPeer, ChannelTransport, Connector, StreamTransport, Transport};
