#![forbid(unsafe_code)]

//! Wire messages between a history client and the host that owns the
//! [`UndoList`](retrace_core::UndoList).
//!
//! Frames are JSON objects tagged by `"op"`:
//!
//! ```text
//! {"op":"add","id":"move","info":{"from":0,"to":5}}
//! {"op":"commit","description":"Move item"}
//! {"op":"undo"}
//! {"op":"dirty"}                    -> {"reply":"dirty","value":true}
//! ```
//!
//! Only `dirty` expects a reply. Every other request is fire-and-forget and
//! relies on the transport to deliver frames in send order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A call proxied to the history host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HistoryRequest {
    Add {
        id: String,
        #[serde(default)]
        info: Value,
    },
    Commit {
        #[serde(default)]
        description: String,
    },
    Undo,
    Redo,
    Save,
    Clear,
    Reset,
    Dirty,
}

impl HistoryRequest {
    /// Message-channel name for hosts that route by name.
    #[must_use]
    pub const fn channel(&self) -> &'static str {
        match self {
            Self::Add { .. } => "undo:add",
            Self::Commit { .. } => "undo:commit",
            Self::Undo => "undo:perform-undo",
            Self::Redo => "undo:perform-redo",
            Self::Save => "undo:save",
            Self::Clear => "undo:clear",
            Self::Reset => "undo:reset",
            Self::Dirty => "undo:is-dirty",
        }
    }

    /// Whether the caller blocks for a [`HistoryReply`].
    #[must_use]
    pub const fn expects_reply(&self) -> bool {
        matches!(self, Self::Dirty)
    }

    /// Encode as a JSON frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a JSON frame.
    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

/// Answer to a request that [`expects_reply`](HistoryRequest::expects_reply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum HistoryReply {
    Dirty { value: bool },
    /// The host could not handle the request frame.
    Error { message: String },
}

impl HistoryReply {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}
