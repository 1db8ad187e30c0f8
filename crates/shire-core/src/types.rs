//! Policy data model
//!
//! A [`Policy`] is the complete set of [`Block`]s published by the daemon.
//! It is never patched: every update replaces it wholesale.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// =============================================================================
// Block State
// =============================================================================

/// Whether a block's patterns participate in verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BlockState {
    /// Patterns are enforced.
    #[serde(alias = "Blocked")]
    Active,
    /// Enforced and locked against manual unblocking on the daemon side.
    #[serde(alias = "BlockedWithLock")]
    Locked,
    /// Retained but inert.
    Unblocked,
}

impl BlockState {
    /// `Active` and `Locked` blocks are enforced.
    #[inline]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active | Self::Locked)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Locked => "Locked",
            Self::Unblocked => "Unblocked",
        }
    }
}

// =============================================================================
// Block
// =============================================================================

/// A named bundle of blacklist and whitelist patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub name: String,
    pub state: BlockState,
    pub blacklist: BTreeSet<String>,
    pub whitelist: BTreeSet<String>,
}

impl Block {
    pub fn new(name: impl Into<String>, state: BlockState) -> Self {
        Self {
            name: name.into(),
            state,
            blacklist: BTreeSet::new(),
            whitelist: BTreeSet::new(),
        }
    }

    pub fn with_blacklist<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_whitelist<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist.extend(patterns.into_iter().map(Into::into));
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

// =============================================================================
// Policy
// =============================================================================

/// Every block currently in force, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Policy {
    pub blocks: BTreeMap<String, Block>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block, replacing any block with the same name.
    pub fn insert(&mut self, block: Block) {
        self.blocks.insert(block.name.clone(), block);
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.insert(block);
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn active_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values().filter(|b| b.is_active())
    }
}

impl FromIterator<Block> for Policy {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        let mut policy = Policy::new();
        for block in iter {
            policy.insert(block);
        }
        policy
    }
}

// =============================================================================
// Verdict
// =============================================================================

/// The block/allow decision for one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub blocked: bool,
    /// Block whose blacklist fired without a whitelist override.
    pub block: Option<String>,
    /// The blacklist pattern that matched.
    pub pattern: Option<String>,
}

impl Verdict {
    pub fn allow() -> Self {
        Self::default()
    }

    pub fn block(block: &str, pattern: &str) -> Self {
        Self {
            blocked: true,
            block: Some(block.to_string()),
            pattern: Some(pattern.to_string()),
        }
    }
}
