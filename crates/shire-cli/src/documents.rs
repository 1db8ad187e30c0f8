//! A [`Host`] backed by a JSON file of open documents.
//!
//! The file is re-read on every sweep, so it can be edited while the agent
//! runs. Notifications are written as JSON lines.

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use shire_agent::{Document, DocumentId, DocumentNotification, Host, HostError};

pub struct FileHost {
    path: Option<PathBuf>,
    out: Mutex<Box<dyn Write + Send>>,
}

#[derive(Serialize)]
struct NotificationLine<'a> {
    id: DocumentId,
    #[serde(flatten)]
    notification: &'a DocumentNotification,
}

impl FileHost {
    pub fn new(path: Option<PathBuf>, out: Box<dyn Write + Send>) -> Self {
        Self {
            path,
            out: Mutex::new(out),
        }
    }

    pub fn stdout(path: Option<PathBuf>) -> Self {
        Self::new(path, Box::new(std::io::stdout()))
    }
}

pub fn parse_documents(text: &str) -> Result<Vec<Document>, HostError> {
    serde_json::from_str(text).map_err(|e| HostError::Unavailable(format!("Invalid documents file: {e}")))
}

#[async_trait]
impl Host for FileHost {
    async fn documents(&self) -> Result<Vec<Document>, HostError> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HostError::Unavailable(format!("Failed to read '{}': {}", path.display(), e)))?;
        parse_documents(&text)
    }

    async fn notify(&self, document: DocumentId, notification: &DocumentNotification) -> Result<(), HostError> {
        let line = serde_json::to_string(&NotificationLine {
            id: document,
            notification,
        })
        .map_err(|e| HostError::Unavailable(e.to_string()))?;

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{line}")
            .and_then(|_| out.flush())
            .map_err(|e| HostError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_documents() {
        let docs = parse_documents(r#"[{"id":1,"url":"https://a.com"},{"id":2,"url":"about:blank"}]"#).unwrap();
        assert_eq!(docs, vec![Document::new(1, "https://a.com"), Document::new(2, "about:blank")]);
        assert!(parse_documents(r#"{"id":1}"#).is_err());
    }

    #[tokio::test]
    async fn test_documents_reread_each_call() {
        let path = std::env::temp_dir().join(format!("shire-cli-documents-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"id":1,"url":"https://a.com"}]"#).unwrap();
        let host = FileHost::new(Some(path.clone()), Box::new(std::io::sink()));
        assert_eq!(host.documents().await.unwrap().len(), 1);

        std::fs::write(&path, "[]").unwrap();
        assert!(host.documents().await.unwrap().is_empty());

        std::fs::remove_file(&path).unwrap();
        assert!(host.documents().await.is_err());
    }

    #[tokio::test]
    async fn test_no_file_means_no_documents() {
        let host = FileHost::new(None, Box::new(std::io::sink()));
        assert!(host.documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notify_writes_json_lines() {
        let buf = SharedBuf::default();
        let host = FileHost::new(None, Box::new(buf.clone()));
        let note = DocumentNotification::BlockPage {
            url: "https://a.com".to_string(),
        };
        host.notify(4, &note).await.unwrap();

        let written = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "{\"id\":4,\"action\":\"blockPage\",\"url\":\"https://a.com\"}\n");
    }
}
