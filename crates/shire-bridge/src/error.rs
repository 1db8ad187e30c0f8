/// Error type for bridge frames and framing.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Frame has no \"type\" field")]
    MissingType,
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Frame too large: {len} bytes (limit {limit})")]
    FrameTooLarge { len: usize, limit: usize },
    #[error("Connection closed")]
    Closed,
}

impl BridgeError {
    /// Errors after which the byte stream can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::FrameTooLarge { .. } | Self::Closed)
    }
}
