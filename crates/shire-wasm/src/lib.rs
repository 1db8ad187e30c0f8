//! WebAssembly bindings for the Shire agent
//!
//! The extension background script owns the bridge port and the tabs API; it
//! hands every bridge message to [`apply_bridge_message`] and asks
//! [`check_blocked`] for verdicts. Policy state lives here.

use std::sync::OnceLock;

use shire_bridge::InboundFrame;
use shire_core::{PolicyStore, VerdictEngine, DEFAULT_INTERNAL_PREFIXES};
use wasm_bindgen::prelude::*;

static ENGINE: OnceLock<VerdictEngine> = OnceLock::new();

fn engine() -> &'static VerdictEngine {
    ENGINE.get_or_init(|| VerdictEngine::new(std::sync::Arc::new(PolicyStore::new())))
}

#[cfg(target_arch = "wasm32")]
fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn console_warn(message: &str) {
    eprintln!("{message}");
}

#[cfg(target_arch = "wasm32")]
fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn console_log(message: &str) {
    println!("{message}");
}

// =============================================================================
// Bridge
// =============================================================================

/// Apply one bridge message. Returns `true` when a new policy was applied and
/// open tabs should be swept.
#[wasm_bindgen]
pub fn apply_bridge_message(json: &str) -> bool {
    apply_message(engine(), json)
}

fn apply_message(engine: &VerdictEngine, json: &str) -> bool {
    match InboundFrame::decode(json.as_bytes()) {
        Ok(InboundFrame::StateUpdate(policy)) => {
            let snapshot = engine.store().apply(policy);
            console_log(&format!(
                "Shire: applied policy generation {} ({} blacklist patterns)",
                snapshot.generation(),
                snapshot.derived().blacklist.len()
            ));
            true
        }
        Ok(_) => false,
        Err(e) => {
            console_warn(&format!("Shire: dropping bridge message: {e}"));
            false
        }
    }
}

// =============================================================================
// Verdicts
// =============================================================================

#[wasm_bindgen]
pub fn is_internal_url(url: &str) -> bool {
    shire_core::is_internal_url(url, DEFAULT_INTERNAL_PREFIXES)
}

fn verdict(engine: &VerdictEngine, url: &str) -> bool {
    !is_internal_url(url) && engine.is_blocked(url)
}

/// `{blocked, url}`, the reply to a content script's `checkBlocked`.
#[wasm_bindgen]
pub fn check_blocked(url: &str) -> JsValue {
    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"blocked".into(), &JsValue::from(verdict(engine(), url)));
    let _ = js_sys::Reflect::set(&result, &"url".into(), &JsValue::from_str(url));
    result.into()
}

#[wasm_bindgen]
pub fn policy_info() -> JsValue {
    let snapshot = engine().store().current();
    let derived = snapshot.derived();

    let blacklist = js_sys::Array::new();
    for pattern in &derived.blacklist {
        blacklist.push(&JsValue::from_str(pattern));
    }
    let whitelist = js_sys::Array::new();
    for pattern in &derived.whitelist {
        whitelist.push(&JsValue::from_str(pattern));
    }

    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"generation".into(), &JsValue::from(snapshot.generation() as f64));
    let _ = js_sys::Reflect::set(&result, &"blocks".into(), &JsValue::from(snapshot.policy().blocks.len() as u32));
    let _ = js_sys::Reflect::set(&result, &"blacklist".into(), &blacklist);
    let _ = js_sys::Reflect::set(&result, &"whitelist".into(), &whitelist);
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fresh() -> VerdictEngine {
        VerdictEngine::new(Arc::new(PolicyStore::new()))
    }

    #[test]
    fn test_apply_message_reports_policy_changes() {
        let engine = fresh();
        let update = r#"{"type":"state_update","state":{"blocks":{"social":{"block_state":"Blocked","blacklist":["twitter.com"]}}}}"#;

        assert!(apply_message(&engine, update));
        assert!(!apply_message(&engine, r#"{"type":"connected"}"#));
        assert!(!apply_message(&engine, "{"));
        assert_eq!(engine.store().generation(), 1);
    }

    #[test]
    fn test_verdict_skips_internal_urls() {
        let engine = fresh();
        apply_message(
            &engine,
            r#"{"type":"state_update","state":{"blocks":{"all":{"block_state":"Blocked","blacklist":["*"]}}}}"#,
        );

        assert!(verdict(&engine, "https://example.com"));
        assert!(!verdict(&engine, "about:newtab"));
        assert!(!verdict(&engine, "moz-extension://abc/blocked.html"));
    }
}
