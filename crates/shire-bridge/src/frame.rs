//! Bridge frames
//!
//! Every frame is a JSON object with a `type` field. Unknown types decode to
//! [`InboundFrame::Unknown`] so newer daemons stay compatible.

use serde::Serialize;
use serde_json::Value;
use shire_core::Policy;

use crate::error::BridgeError;
use crate::schema::{policy_from_frame, state_to_value};

/// A frame sent by the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Full replacement of the policy.
    StateUpdate(Policy),
    /// The daemon acknowledged the connection.
    Connected,
    /// The daemon reports the link as down.
    Disconnected,
    /// Any other `type`.
    Unknown(String),
}

impl InboundFrame {
    /// Decode a raw frame payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, BridgeError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: Value) -> Result<Self, BridgeError> {
        let frame_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(BridgeError::MissingType)?
            .to_string();

        match frame_type.as_str() {
            "state_update" => Ok(Self::StateUpdate(policy_from_frame(&mut value)?)),
            "connected" => Ok(Self::Connected),
            "disconnected" => Ok(Self::Disconnected),
            _ => Ok(Self::Unknown(frame_type)),
        }
    }

    /// The `type` field this frame was decoded from.
    pub fn type_name(&self) -> &str {
        match self {
            Self::StateUpdate(_) => "state_update",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Unknown(t) => t,
        }
    }
}

/// A frame sent to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Heartbeat sent on every connect.
    Ping,
}

impl OutboundFrame {
    pub fn encode(&self) -> Result<Vec<u8>, BridgeError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Encode a canonical `state_update` frame, as the daemon would send it.
pub fn encode_state_update(policy: &Policy) -> Result<Vec<u8>, BridgeError> {
    let frame = serde_json::json!({
        "type": "state_update",
        "state": state_to_value(policy),
    });
    Ok(serde_json::to_vec(&frame)?)
}
