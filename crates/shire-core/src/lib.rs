//! Shire Core Library
//!
//! This crate holds the policy model and the URL decision engine of the Shire
//! blocker agent. It has no I/O: policies arrive from the bridge crate, and
//! verdicts are consumed by the agent and the browser binding.
//!
//! # Modules
//!
//! - `url`: scheme and `www.` normalization, internal URL detection
//! - `pattern`: wildcard-anchored prefix matching
//! - `types`: blocks, policies and verdicts
//! - `policy`: the atomically replaced policy store and its derived sets
//! - `verdict`: whitelist-over-blacklist evaluation

pub mod pattern;
pub mod policy;
pub mod types;
pub mod url;
pub mod verdict;

// Re-export commonly used types
pub use pattern::{matches, Pattern};
pub use policy::{CompiledBlock, DerivedSets, PolicySnapshot, PolicyStore};
pub use types::{Block, BlockState, Policy, Verdict};
pub use url::{is_internal_url, normalize, DEFAULT_INTERNAL_PREFIXES};
pub use verdict::{evaluate, VerdictEngine};
