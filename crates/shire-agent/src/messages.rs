//! Messages exchanged with document scripts.

use serde::{Deserialize, Serialize};

/// A request from a document script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostRequest {
    /// `{"action":"checkBlocked","url":..}`
    CheckBlocked { url: String },
}

/// `{"blocked":..,"url":..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckBlockedResponse {
    pub blocked: bool,
    pub url: String,
}

/// A fire-and-forget notification addressed to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum DocumentNotification {
    /// `{"action":"blockPage","url":..}`
    BlockPage { url: String },
}
