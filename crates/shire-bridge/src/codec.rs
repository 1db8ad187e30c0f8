//! Length-prefixed framing
//!
//! A frame is a 4-byte unsigned length followed by that many payload bytes.
//! The daemon's Unix socket uses big-endian lengths; browser native messaging
//! uses the platform's native order.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::BridgeError;

/// Largest payload accepted by default (1 MiB, the native messaging limit
/// for host-to-browser messages).
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

const LEN_PREFIX_SIZE: usize = 4;

/// Byte order of the length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Daemon socket.
    #[default]
    Big,
    /// Browser native messaging.
    Native,
}

impl ByteOrder {
    #[inline]
    fn decode(self, bytes: [u8; LEN_PREFIX_SIZE]) -> u32 {
        match self {
            Self::Big => u32::from_be_bytes(bytes),
            Self::Native => u32::from_ne_bytes(bytes),
        }
    }

    #[inline]
    fn encode(self, len: u32) -> [u8; LEN_PREFIX_SIZE] {
        match self {
            Self::Big => len.to_be_bytes(),
            Self::Native => len.to_ne_bytes(),
        }
    }
}

/// Framing parameters for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    pub byte_order: ByteOrder,
    pub max_frame_len: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Big,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl FrameCodec {
    pub fn new(byte_order: ByteOrder, max_frame_len: usize) -> Self {
        Self {
            byte_order,
            max_frame_len,
        }
    }

    /// Read one frame. Returns `Ok(None)` once the peer has closed the stream.
    pub async fn read_frame<R>(&self, reader: &mut R) -> Result<Option<Vec<u8>>, BridgeError>
    where
        R: AsyncRead + Unpin,
    {
        let mut len_buf = [0u8; LEN_PREFIX_SIZE];
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let len = self.byte_order.decode(len_buf) as usize;
        if len > self.max_frame_len {
            return Err(BridgeError::FrameTooLarge {
                len,
                limit: self.max_frame_len,
            });
        }

        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload).await?;
        Ok(Some(payload))
    }

    /// Write one frame and flush.
    pub async fn write_frame<W>(&self, writer: &mut W, payload: &[u8]) -> Result<(), BridgeError>
    where
        W: AsyncWrite + Unpin,
    {
        if payload.len() > self.max_frame_len {
            return Err(BridgeError::FrameTooLarge {
                len: payload.len(),
                limit: self.max_frame_len,
            });
        }

        writer.write_all(&self.byte_order.encode(payload.len() as u32)).await?;
        writer.write_all(payload).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_both_orders() {
        for order in [ByteOrder::Big, ByteOrder::Native] {
            let codec = FrameCodec::new(order, DEFAULT_MAX_FRAME_LEN);
            let mut buf = Vec::new();
            codec.write_frame(&mut buf, br#"{"type":"ping"}"#).await.unwrap();
            codec.write_frame(&mut buf, b"").await.unwrap();

            let mut reader = buf.as_slice();
            assert_eq!(
                codec.read_frame(&mut reader).await.unwrap().as_deref(),
                Some(&br#"{"type":"ping"}"#[..])
            );
            assert_eq!(codec.read_frame(&mut reader).await.unwrap().as_deref(), Some(&b""[..]));
            assert!(codec.read_frame(&mut reader).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_big_endian_prefix_layout() {
        let codec = FrameCodec::default();
        let mut buf = Vec::new();
        codec.write_frame(&mut buf, b"abc").await.unwrap();
        assert_eq!(buf, vec![0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[tokio::test]
    async fn test_oversized_frame_is_rejected() {
        let codec = FrameCodec::new(ByteOrder::Big, 4);
        let data = [0u8, 0, 0, 5, 1, 2, 3, 4, 5];
        let mut reader = &data[..];
        assert!(matches!(
            codec.read_frame(&mut reader).await,
            Err(BridgeError::FrameTooLarge { len: 5, limit: 4 })
        ));

        let mut out = Vec::new();
        assert!(codec.write_frame(&mut out, b"12345").await.is_err());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_truncated_payload_is_an_error() {
        let codec = FrameCodec::default();
        let data = [0u8, 0, 0, 10, b'{'];
        let mut reader = &data[..];
        assert!(matches!(codec.read_frame(&mut reader).await, Err(BridgeError::Io(_))));
    }
}
