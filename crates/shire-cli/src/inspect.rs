use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde_json::Value;
use shire_bridge::{policy_from_state, InboundFrame};
use shire_core::{BlockState, DerivedSets, Policy};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Read a policy from a `state_update` frame or a bare state object.
pub fn load_policy(path: &Path) -> Result<Policy, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    parse_policy(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

pub fn parse_policy(text: &str) -> Result<Policy, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {e}"))?;

    if value.get("type").is_none() {
        return policy_from_state(value).map_err(|e| e.to_string());
    }

    match InboundFrame::from_value(value).map_err(|e| e.to_string())? {
        InboundFrame::StateUpdate(policy) => Ok(policy),
        other => Err(format!("Expected a state_update frame, got '{}'", other.type_name())),
    }
}

fn state_label(state: BlockState) -> (&'static str, &'static str) {
    match state {
        BlockState::Active => ("Blocked", YELLOW),
        BlockState::Locked => ("Locked", RED),
        BlockState::Unblocked => ("Unblocked", GREEN),
    }
}

/// Block table followed by the derived pattern sets.
pub fn render(policy: &Policy) -> String {
    let mut out = String::new();

    let name_width = policy
        .blocks
        .keys()
        .map(|k| k.len())
        .max()
        .unwrap_or(10)
        .max("Block Name".len());
    let status_width = "Unblocked".len();

    let _ = writeln!(
        out,
        "{:<name_width$}  {:<status_width$}  {:>9}  {:>9}",
        "Block Name", "Status", "Blacklist", "Whitelist"
    );
    let _ = writeln!(out, "{:-<name_width$}  {:-<status_width$}  {:-<9}  {:-<9}", "", "", "", "");

    for (name, block) in &policy.blocks {
        let (label, color) = state_label(block.state);
        // Pad by the plain label; escape codes would throw off the width.
        let padding = status_width - label.len();
        let _ = writeln!(
            out,
            "{:<name_width$}  {color}{label}{RESET}{:padding$}  {:>9}  {:>9}",
            name,
            "",
            block.blacklist.len(),
            block.whitelist.len(),
        );
    }

    let derived = DerivedSets::from_policy(policy);
    let _ = writeln!(out);
    let _ = writeln!(out, "Blacklist ({}):", derived.blacklist.len());
    for pattern in &derived.blacklist {
        let _ = writeln!(out, "  {pattern}");
    }
    let _ = writeln!(out, "Whitelist ({}):", derived.whitelist.len());
    for pattern in &derived.whitelist {
        let _ = writeln!(out, "  {pattern}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shire_core::Block;

    #[test]
    fn test_parse_policy_accepts_frame_and_bare_state() {
        let frame = r#"{"type":"state_update","state":{"blocks":{"a":{"block_state":"Blocked","blacklist":["a.com"]}}}}"#;
        let bare = r#"{"blocks":{"a":{"block_state":"Blocked","blacklist":["a.com"]}}}"#;
        assert_eq!(parse_policy(frame).unwrap(), parse_policy(bare).unwrap());

        assert!(parse_policy(r#"{"type":"connected"}"#).is_err());
        assert!(parse_policy("nope").is_err());
    }

    #[test]
    fn test_render_lists_blocks_and_active_patterns() {
        let policy = Policy::new()
            .with_block(Block::new("news", BlockState::Active).with_blacklist(["cnn.com", "bbc.co.uk"]))
            .with_block(Block::new("social", BlockState::Unblocked).with_blacklist(["x.com"]))
            .with_block(
                Block::new("video", BlockState::Locked)
                    .with_blacklist(["youtube.com"])
                    .with_whitelist(["youtube.com/watch?v=lecture*"]),
            );

        let text = render(&policy);
        assert!(text.contains(&format!("{YELLOW}Blocked{RESET}")));
        assert!(text.contains(&format!("{RED}Locked{RESET}")));
        assert!(text.contains(&format!("{GREEN}Unblocked{RESET}")));
        assert!(text.contains("Blacklist (3):"));
        assert!(text.contains("  youtube.com\n"));
        assert!(!text.contains("  x.com\n"));
        assert!(text.contains("Whitelist (1):"));
    }
}
