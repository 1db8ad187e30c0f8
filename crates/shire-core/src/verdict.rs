//! Verdict Engine
//!
//! Turns a URL plus the live policy into a block/allow decision. Whitelists
//! are scoped to their own block: a block fires when one of its blacklist
//! patterns matches and none of its whitelist patterns do. A URL is blocked
//! when any active block fires.

use std::sync::Arc;

use crate::policy::{CompiledBlock, PolicySnapshot, PolicyStore};
use crate::types::Verdict;
use crate::url::normalize;

/// Evaluate `url` against a single snapshot.
pub fn evaluate(snapshot: &PolicySnapshot, url: &str) -> Verdict {
    if url.is_empty() || snapshot.is_inert() {
        return Verdict::allow();
    }

    let normalized = normalize(url);
    if normalized.is_empty() {
        return Verdict::allow();
    }

    for block in snapshot.active_blocks() {
        if let Some(pattern) = block_fires(block, normalized) {
            return Verdict::block(&block.name, pattern);
        }
    }

    Verdict::allow()
}

/// Returns the blacklist pattern that blocks `url` within this block, if any.
fn block_fires<'b>(block: &'b CompiledBlock, url: &str) -> Option<&'b str> {
    let hit = block.blacklist.iter().find(|p| p.matches_normalized(url))?;

    if block.whitelist.iter().any(|p| p.matches_normalized(url)) {
        return None;
    }

    Some(hit.as_str())
}

// =============================================================================
// Engine
// =============================================================================

/// Verdicts against whatever policy is live at the time of each call.
#[derive(Debug, Clone)]
pub struct VerdictEngine {
    store: Arc<PolicyStore>,
}

impl VerdictEngine {
    pub fn new(store: Arc<PolicyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<PolicyStore> {
        &self.store
    }

    pub fn evaluate(&self, url: &str) -> Verdict {
        evaluate(&self.store.current(), url)
    }

    pub fn is_blocked(&self, url: &str) -> bool {
        self.evaluate(url).blocked
    }
}
