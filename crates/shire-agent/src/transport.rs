//! Bridge transports
//!
//! The connection state machine only needs an ordered, message-framed
//! channel. [`StreamTransport`] provides one over any byte stream using the
//! length-prefixed codec; [`ChannelTransport`] is an in-process channel for
//! hosts that already deliver whole messages.

use async_trait::async_trait;
use shire_bridge::{BridgeError, FrameCodec, OutboundFrame};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

/// An open, ordered link to the daemon.
#[async_trait]
pub trait Transport: Send {
    /// Send one frame.
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), BridgeError>;

    /// Next raw frame payload, or `Ok(None)` once the daemon closed the link.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, BridgeError>;
}

/// Opens transports; called once per connection attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport + 'static;

    async fn connect(&self) -> Result<Self::Transport, BridgeError>;
}

// =============================================================================
// Stream Transport
// =============================================================================

/// Length-prefixed frames over a byte stream.
#[derive(Debug)]
pub struct StreamTransport<R, W> {
    reader: R,
    writer: W,
    codec: FrameCodec,
}

impl<R, W> StreamTransport<R, W> {
    pub fn new(reader: R, writer: W, codec: FrameCodec) -> Self {
        Self { reader, writer, codec }
    }
}

#[async_trait]
impl<R, W> Transport for StreamTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), BridgeError> {
        let payload = frame.encode()?;
        self.codec.write_frame(&mut self.writer, &payload).await
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, BridgeError> {
        self.codec.read_frame(&mut self.reader).await
    }
}

// =============================================================================
// Channel Transport
// =============================================================================

/// Whole messages over in-process channels.
#[derive(Debug)]
pub struct ChannelTransport {
    outgoing: mpsc::UnboundedSender<Vec<u8>>,
    incoming: mpsc::UnboundedReceiver<Vec<u8>>,
}

/// The daemon-facing end of a [`ChannelTransport`]. Dropping it closes the
/// link.
#[derive(Debug)]
pub struct ChannelPeer {
    /// Frames the agent sent.
    pub sent: mpsc::UnboundedReceiver<Vec<u8>>,
    /// Feed frames to the agent.
    pub frames: mpsc::UnboundedSender<Vec<u8>>,
}

/// Create a connected transport/peer pair.
pub fn channel_transport() -> (ChannelTransport, ChannelPeer) {
    let (to_peer, sent) = mpsc::unbounded_channel();
    let (frames, from_peer) = mpsc::unbounded_channel();

    (
        ChannelTransport {
            outgoing: to_peer,
            incoming: from_peer,
        },
        ChannelPeer { sent, frames },
    )
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), BridgeError> {
        let payload = frame.encode()?;
        self.outgoing.send(payload).map_err(|_| BridgeError::Closed)
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>, BridgeError> {
        Ok(self.incoming.recv().await)
    }
}
