//! Tab Sweeper
//!
//! Re-evaluates every open document whenever the policy changes, and answers
//! on-demand checks for single URLs. Each document is evaluated against the
//! snapshot that is live when the sweep reaches it, so a sweep that spans a
//! policy update never blocks a document the newer policy allows.

use serde::{Deserialize, Serialize};
use shire_core::{is_internal_url, VerdictEngine, DEFAULT_INTERNAL_PREFIXES};

use crate::host::{Document, Host};
use crate::messages::{CheckBlockedResponse, DocumentNotification, HostRequest};

/// Sweep settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// URLs starting with any of these are never evaluated.
    pub internal_prefixes: Vec<String>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            internal_prefixes: DEFAULT_INTERNAL_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Policy generation live when the sweep started.
    pub generation: u64,
    pub scanned: usize,
    pub skipped_internal: usize,
    pub blocked: usize,
    /// Block notifications the host could not deliver.
    pub failed_signals: usize,
}

pub struct TabSweeper<H> {
    host: H,
    engine: VerdictEngine,
    config: SweepConfig,
}

impl<H: Host> TabSweeper<H> {
    pub fn new(host: H, engine: VerdictEngine, config: SweepConfig) -> Self {
        Self { host, engine, config }
    }

    pub fn engine(&self) -> &VerdictEngine {
        &self.engine
    }

    pub fn is_internal(&self, url: &str) -> bool {
        is_internal_url(url, &self.config.internal_prefixes)
    }

    /// Evaluate every open document and notify the blocked ones.
    pub async fn resweep(&self) -> SweepReport {
        let start = self.engine.store().current();
        let mut report = SweepReport {
            generation: start.generation(),
            ..SweepReport::default()
        };

        if start.is_inert() {
            log::debug!("Skipping sweep: policy generation {} blocks nothing", report.generation);
            return report;
        }
        drop(start);

        let documents = match self.host.documents().await {
            Ok(documents) => documents,
            Err(e) => {
                log::warn!("Failed to enumerate documents: {e}");
                return report;
            }
        };

        for document in &documents {
            if self.is_internal(&document.url) {
                report.skipped_internal += 1;
                continue;
            }
            report.scanned += 1;

            if !self.engine.is_blocked(&document.url) {
                continue;
            }
            report.blocked += 1;

            if !self.signal(document).await {
                report.failed_signals += 1;
            }
        }

        log::debug!(
            "Sweep of generation {} done: {} scanned, {} blocked, {} undelivered",
            report.generation,
            report.scanned,
            report.blocked,
            report.failed_signals
        );

        report
    }

    /// On-demand verdict for one URL. Internal URLs are never blocked.
    pub fn evaluate_one(&self, url: &str) -> bool {
        if self.is_internal(url) {
            return false;
        }

        let verdict = self.engine.evaluate(url);
        if verdict.blocked {
            log::debug!(
                "Blocked {url} (block {:?}, pattern {:?})",
                verdict.block.as_deref().unwrap_or_default(),
                verdict.pattern.as_deref().unwrap_or_default()
            );
        }
        verdict.blocked
    }

    /// A document was activated or navigated; notify it if it is blocked.
    pub async fn handle_navigation(&self, document: &Document) -> bool {
        if document.url.is_empty() || !self.evaluate_one(&document.url) {
            return false;
        }
        self.signal(document).await;
        true
    }

    /// Answer a request from a document script.
    pub fn handle_request(&self, request: HostRequest) -> CheckBlockedResponse {
        match request {
            HostRequest::CheckBlocked { url } => CheckBlockedResponse {
                blocked: self.evaluate_one(&url),
                url,
            },
        }
    }

    /// Send `blockPage`; failures are swallowed. Returns whether it was delivered.
    async fn signal(&self, document: &Document) -> bool {
        let notification = DocumentNotification::BlockPage {
            url: document.url.clone(),
        };

        match self.host.notify(document.id, &notification).await {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Block notification to document {} dropped: {e}", document.id);
                false
            }
        }
    }
}
