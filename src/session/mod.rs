//! Per-connection session types
//!
//! A connection is represented in two halves: a cloneable [`ConnectionHandle`]
//! stored in the registry for outbound delivery, and a [`ConnectionState`]
//! owned exclusively by the connection task tracking its declared role.

pub mod handle;
pub mod state;

pub use handle::ConnectionHandle;
pub use state::ConnectionState;
