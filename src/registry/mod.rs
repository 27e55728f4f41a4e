//! Stream registry for signaling routing
//!
//! The registry is the single source of truth for who is broadcasting and
//! viewing which stream. It maps each active stream ID to at most one
//! broadcaster connection and a set of viewer connections keyed by
//! server-assigned viewer IDs.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<StreamRegistry>
//!                 ┌───────────────────────────┐
//!                 │ streams: HashMap<String,  │
//!                 │   StreamSession {         │
//!                 │     broadcaster: Option,  │
//!                 │     viewers: HashMap,     │
//!                 │   }                       │
//!                 │ >                         │
//!                 └────────────┬──────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!   [Broadcaster]          [Viewer]              [Viewer]
//!        │                     │                     │
//!        └── router ──► handle.send() ──► writer task ──► WebSocket
//! ```
//!
//! Sessions exist only while they hold at least one connection; the last
//! departure removes the entry immediately. All state is in-memory and
//! process-lifetime only — clients rejoin after a restart.

pub mod entry;
pub mod store;

pub use entry::{SessionStats, StreamSession};
pub use store::StreamRegistry;
