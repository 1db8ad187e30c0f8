//! Policy store
//!
//! Holds the current [`PolicySnapshot`]. A new snapshot is fully built
//! (patterns compiled, derived sets rebuilt from scratch) before it is
//! published, and publishing is a single `Arc` swap, so readers see either
//! the old policy or the new one and never a mix of the two.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::pattern::Pattern;
use crate::types::{Block, Policy};

// =============================================================================
// Derived Sets
// =============================================================================

/// Flattened blacklist and whitelist patterns of every active block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedSets {
    pub blacklist: BTreeSet<String>,
    pub whitelist: BTreeSet<String>,
}

impl DerivedSets {
    /// Clear both sets and repopulate them from `policy`, skipping
    /// unblocked blocks.
    pub fn rebuild(&mut self, policy: &Policy) {
        self.blacklist.clear();
        self.whitelist.clear();

        for block in policy.active_blocks() {
            self.blacklist.extend(block.blacklist.iter().cloned());
            self.whitelist.extend(block.whitelist.iter().cloned());
        }
    }

    pub fn from_policy(policy: &Policy) -> Self {
        let mut sets = Self::default();
        sets.rebuild(policy);
        sets
    }
}

// =============================================================================
// Compiled Block
// =============================================================================

/// An active block with its patterns compiled for matching.
#[derive(Debug, Clone)]
pub struct CompiledBlock {
    pub name: String,
    pub blacklist: Vec<Pattern>,
    pub whitelist: Vec<Pattern>,
}

impl CompiledBlock {
    pub fn compile(block: &Block) -> Self {
        Self {
            name: block.name.clone(),
            blacklist: block.blacklist.iter().map(|p| Pattern::compile(p)).collect(),
            whitelist: block.whitelist.iter().map(|p| Pattern::compile(p)).collect(),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// An immutable view of one applied policy.
#[derive(Debug, Clone, Default)]
pub struct PolicySnapshot {
    generation: u64,
    policy: Policy,
    active: Vec<CompiledBlock>,
    derived: DerivedSets,
}

impl PolicySnapshot {
    pub fn build(generation: u64, policy: Policy) -> Self {
        let active = policy.active_blocks().map(CompiledBlock::compile).collect();
        let derived = DerivedSets::from_policy(&policy);

        Self {
            generation,
            policy,
            active,
            derived,
        }
    }

    /// 0 for the initial empty policy, +1 per apply.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    #[inline]
    pub fn active_blocks(&self) -> &[CompiledBlock] {
        &self.active
    }

    #[inline]
    pub fn derived(&self) -> &DerivedSets {
        &self.derived
    }

    /// True when no block is enforced, so every URL is allowed.
    #[inline]
    pub fn is_inert(&self) -> bool {
        self.active.is_empty()
    }
}

// =============================================================================
// Store
// =============================================================================

/// Owner of the live policy.
#[derive(Debug, Default)]
pub struct PolicyStore {
    current: RwLock<Arc<PolicySnapshot>>,
}

impl PolicyStore {
    /// Create a store holding the empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the policy wholesale and return the published snapshot.
    pub fn apply(&self, policy: Policy) -> Arc<PolicySnapshot> {
        // Serialize writers so generations stay strictly increasing.
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let snapshot = Arc::new(PolicySnapshot::build(guard.generation + 1, policy));
        *guard = Arc::clone(&snapshot);

        log::info!(
            "Applied policy generation {} ({} blocks, {} active, {} blacklist / {} whitelist patterns)",
            snapshot.generation,
            snapshot.policy.blocks.len(),
            snapshot.active.len(),
            snapshot.derived.blacklist.len(),
            snapshot.derived.whitelist.len(),
        );

        snapshot
    }

    /// The snapshot currently in force.
    pub fn current(&self) -> Arc<PolicySnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// A copy of the policy currently in force.
    pub fn current_policy(&self) -> Policy {
        self.current().policy.clone()
    }

    pub fn generation(&self) -> u64 {
        self.current().generation
    }
}
