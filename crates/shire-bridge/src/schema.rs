//! Wire schema of `state_update` frames
//!
//! The canonical shape is
//! `{"state":{"blocks":{<name>:{"block_state":..,"blacklist":[..],"whitelist":[..]}}}}`.
//! Two older shapes are still normalized here into the same [`Policy`]:
//!
//! - `{"state":{"active_blocks":[{"blacklist":[..],"whitelist":[..]}]}}`, where
//!   every entry is active and unnamed entries get `active_block_<index>`;
//! - `{"blocks":{..}}` at the top level of the frame, with no `state` wrapper.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shire_core::{Block, BlockState, Policy};

use crate::error::BridgeError;

#[derive(Debug, Deserialize, Serialize)]
struct WireBlock {
    block_state: BlockState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blacklist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    whitelist: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct LegacyActiveBlock {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    blacklist: Option<Vec<String>>,
    #[serde(default)]
    whitelist: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct WireState {
    #[serde(default)]
    blocks: Option<BTreeMap<String, WireBlock>>,
    #[serde(default)]
    active_blocks: Option<Vec<LegacyActiveBlock>>,
}

impl WireBlock {
    fn into_block(self, name: String) -> Block {
        Block::new(name, self.block_state)
            .with_blacklist(self.blacklist.unwrap_or_default())
            .with_whitelist(self.whitelist.unwrap_or_default())
    }
}

fn from_blocks(blocks: BTreeMap<String, WireBlock>) -> Policy {
    blocks
        .into_iter()
        .map(|(name, block)| block.into_block(name))
        .collect()
}

fn from_active_blocks(entries: Vec<LegacyActiveBlock>) -> Policy {
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            let name = entry.name.unwrap_or_else(|| format!("active_block_{idx}"));
            Block::new(name, BlockState::Active)
                .with_blacklist(entry.blacklist.unwrap_or_default())
                .with_whitelist(entry.whitelist.unwrap_or_default())
        })
        .collect()
}

/// Extract the policy carried by a `state_update` frame.
pub fn policy_from_frame(frame: &mut Value) -> Result<Policy, BridgeError> {
    if let Some(state) = frame.get_mut("state") {
        return policy_from_state(state.take());
    }

    if let Some(blocks) = frame.get_mut("blocks") {
        log::warn!("state_update without a \"state\" wrapper is deprecated");
        let blocks: BTreeMap<String, WireBlock> =
            serde_json::from_value(blocks.take()).map_err(|e| BridgeError::InvalidState(e.to_string()))?;
        return Ok(from_blocks(blocks));
    }

    Err(BridgeError::InvalidState("state_update has no \"state\"".to_string()))
}

/// Convert the `state` object of a `state_update` frame.
pub fn policy_from_state(state: Value) -> Result<Policy, BridgeError> {
    let state: WireState = serde_json::from_value(state).map_err(|e| BridgeError::InvalidState(e.to_string()))?;

    match (state.blocks, state.active_blocks) {
        (Some(blocks), legacy) => {
            if legacy.is_some() {
                log::warn!("state_update carries both \"blocks\" and \"active_blocks\"; using \"blocks\"");
            }
            Ok(from_blocks(blocks))
        }
        (None, Some(entries)) => {
            log::warn!("\"active_blocks\" state schema is deprecated");
            Ok(from_active_blocks(entries))
        }
        (None, None) => Err(BridgeError::InvalidState(
            "state has neither \"blocks\" nor \"active_blocks\"".to_string(),
        )),
    }
}

/// Serialize a policy in the canonical schema (the `state` object).
pub fn state_to_value(policy: &Policy) -> Value {
    let blocks: BTreeMap<&str, WireBlock> = policy
        .blocks
        .values()
        .map(|block| {
            let wire = WireBlock {
                block_state: block.state,
                blacklist: Some(block.blacklist.iter().cloned().collect()),
                whitelist: Some(block.whitelist.iter().cloned().collect()),
            };
            (block.name.as_str(), wire)
        })
        .collect();

    serde_json::json!({ "blocks": blocks })
}
