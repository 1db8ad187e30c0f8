//! Bridge transport over the daemon's Unix socket.

use std::path::PathBuf;

use async_trait::async_trait;
use shire_agent::{Connector, StreamTransport};
use shire_bridge::{BridgeError, ByteOrder, FrameCodec};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;

pub struct UnixConnector {
    path: PathBuf,
    codec: FrameCodec,
}

impl UnixConnector {
    pub fn new(path: PathBuf, max_frame_len: usize) -> Self {
        Self {
            path,
            codec: FrameCodec::new(ByteOrder::Big, max_frame_len),
        }
    }
}

#[async_trait]
impl Connector for UnixConnector {
    type Transport = StreamTransport<OwnedReadHalf, OwnedWriteHalf>;

    async fn connect(&self) -> Result<Self::Transport, BridgeError> {
        let stream = UnixStream::connect(&self.path).await?;
        let (reader, writer) = stream.into_split();
        log::info!("Connected to bridge socket {}", self.path.display());
        Ok(StreamTransport::new(reader, writer, self.codec))
    }
}
