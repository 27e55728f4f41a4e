//! cast-relay: WebRTC signaling relay for one-to-many live-stream rooms
//!
//! A standalone process that brokers WebRTC connection setup between a
//! single broadcaster and many viewers per stream. Peers connect over
//! WebSocket, declare a role for an opaque stream ID, and the relay routes
//! typed signaling messages (offers, answers, ICE candidates) to the right
//! peer. Media itself never passes through this process.
//!
//! # Quick start
//!
//! ```no_run
//! use cast_relay::{RelayServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> cast_relay::Result<()> {
//!     let server = RelayServer::new(ServerConfig::default());
//!     server.run().await
//! }
//! ```
//!
//! # Guarantees (and non-guarantees)
//!
//! - At most one broadcaster per stream; a new broadcaster join silently
//!   replaces the previous reference and re-notifies viewers.
//! - Message order from a single connection is preserved; no ordering across
//!   connections.
//! - Delivery is best-effort, at-most-once. No queueing, no retries, no
//!   persistence: a restart drops all sessions and clients rejoin.
//! - One bad message never terminates an otherwise healthy connection.

pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{RelayError, Result};
pub use protocol::{ClientMessage, ServerMessage};
pub use registry::StreamRegistry;
pub use server::{MessageRouter, RelayServer, ServerConfig};
pub use session::{ConnectionHandle, ConnectionState};
