//! Shire Bridge Protocol
//!
//! This crate decodes the frames the Shire daemon sends over the bridge and
//! normalizes every accepted `state_update` schema into a [`shire_core::Policy`].

pub mod codec;
pub mod error;
pub mod frame;
pub mod schema;

pub use codec::{ByteOrder, FrameCodec, DEFAULT_MAX_FRAME_LEN};
pub use error::BridgeError;
pub use frame::{encode_state_update, InboundFrame, OutboundFrame};
pub use schema::{policy_from_state, state_to_value};
