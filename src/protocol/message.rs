//! Signaling message types
//!
//! The relay speaks a small closed protocol: join declarations, a stream
//! request, and three opaque WebRTC payload kinds (offer / answer /
//! ice-candidate) that are passed through structurally unchanged. Unknown
//! `type` values fail deserialization and are dropped by the connection
//! loop without closing the connection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The three relayed WebRTC payload kinds
///
/// The relay never inspects the payload itself; this tag only selects which
/// variant the forwarded [`ServerMessage`] is built as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Offer => write!(f, "offer"),
            SignalKind::Answer => write!(f, "answer"),
            SignalKind::IceCandidate => write!(f, "ice-candidate"),
        }
    }
}

/// Messages received from a connected peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Declare broadcaster role for a stream
    JoinAsBroadcaster {
        #[serde(rename = "streamId")]
        stream_id: String,
    },

    /// Declare viewer role for a stream
    JoinAsViewer {
        #[serde(rename = "streamId")]
        stream_id: String,
    },

    /// Viewer asks the broadcaster to initiate negotiation
    RequestStream,

    /// WebRTC SDP offer, opaque to the relay
    Offer {
        #[serde(default)]
        data: Value,
        #[serde(rename = "targetViewerId", default, skip_serializing_if = "Option::is_none")]
        target_viewer_id: Option<String>,
    },

    /// WebRTC SDP answer, opaque to the relay
    Answer {
        #[serde(default)]
        data: Value,
        #[serde(rename = "targetViewerId", default, skip_serializing_if = "Option::is_none")]
        target_viewer_id: Option<String>,
    },

    /// WebRTC ICE candidate, opaque to the relay
    IceCandidate {
        #[serde(default)]
        data: Value,
        #[serde(rename = "targetViewerId", default, skip_serializing_if = "Option::is_none")]
        target_viewer_id: Option<String>,
    },
}

/// Messages sent to a connected peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent to viewer(s) when a broadcaster is present for their stream
    BroadcasterAvailable,

    /// Sent to viewers when their broadcaster disconnects
    BroadcasterLeft,

    /// Tells the broadcaster that a specific viewer wants the stream
    ViewerRequest {
        #[serde(rename = "viewerId")]
        viewer_id: String,
    },

    /// Forwarded SDP offer; `viewer_id` is present on viewer-to-broadcaster
    /// traffic so the broadcaster can address its reply
    Offer {
        data: Value,
        #[serde(rename = "viewerId", default, skip_serializing_if = "Option::is_none")]
        viewer_id: Option<String>,
    },

    /// Forwarded SDP answer, same shape as [`ServerMessage::Offer`]
    Answer {
        data: Value,
        #[serde(rename = "viewerId", default, skip_serializing_if = "Option::is_none")]
        viewer_id: Option<String>,
    },

    /// Forwarded ICE candidate, same shape as [`ServerMessage::Offer`]
    IceCandidate {
        data: Value,
        #[serde(rename = "viewerId", default, skip_serializing_if = "Option::is_none")]
        viewer_id: Option<String>,
    },
}

impl ServerMessage {
    /// Build a forwarded signaling payload of the given kind
    ///
    /// `viewer_id` identifies the originating viewer on viewer-to-broadcaster
    /// traffic; broadcaster-to-viewer traffic carries `None`.
    pub fn signal(kind: SignalKind, data: Value, viewer_id: Option<String>) -> Self {
        match kind {
            SignalKind::Offer => ServerMessage::Offer { data, viewer_id },
            SignalKind::Answer => ServerMessage::Answer { data, viewer_id },
            SignalKind::IceCandidate => ServerMessage::IceCandidate { data, viewer_id },
        }
    }
}
