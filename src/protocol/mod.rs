//! Wire protocol for the signaling relay
//!
//! Messages are JSON text frames with a `type` tag discriminating the
//! message kind. Field names follow the wire convention (`streamId`,
//! `viewerId`, `targetViewerId`) rather than Rust casing.

pub mod message;

pub use message::{ClientMessage, ServerMessage, SignalKind};
