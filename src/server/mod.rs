//! WebSocket relay server
//!
//! Accept loop, per-connection pump, and the message router that ties
//! connections to the registry.

pub mod config;
pub mod connection;
pub mod listener;
pub mod router;

pub use config::ServerConfig;
pub use connection::Connection;
pub use listener::RelayServer;
pub use router::MessageRouter;
