//! The host environment: open documents and a way to message them.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::messages::DocumentNotification;

/// Host-assigned document (tab) identifier.
pub type DocumentId = i64;

/// An open document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub url: String,
}

impl Document {
    pub fn new(id: DocumentId, url: impl Into<String>) -> Self {
        Self { id, url: url.into() }
    }
}

/// Error type for host calls.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Document {0} no longer exists")]
    DocumentGone(DocumentId),
    #[error("Document {0} has no message listener")]
    NoListener(DocumentId),
    #[error("Host unavailable: {0}")]
    Unavailable(String),
}

/// Tab enumeration and tab messaging primitives of the host.
#[async_trait]
pub trait Host: Send + Sync {
    /// Every currently open document.
    async fn documents(&self) -> Result<Vec<Document>, HostError>;

    /// Deliver a notification to one document.
    async fn notify(&self, document: DocumentId, notification: &DocumentNotification) -> Result<(), HostError>;
}

#[async_trait]
impl<H: Host + ?Sized> Host for Arc<H> {
    async fn documents(&self) -> Result<Vec<Document>, HostError> {
        (**self).documents().await
    }

    async fn notify(&self, document: DocumentId, notification: &DocumentNotification) -> Result<(), HostError> {
        (**self).notify(document, notification).await
    }
}
