//! Connection handle
//!
//! The registry never touches the WebSocket directly; it holds handles that
//! feed each connection's writer task through an unbounded channel. Sends
//! are best-effort: a handle whose connection has gone away swallows the
//! message, matching the relay's at-most-once delivery contract.

use tokio::sync::mpsc;

use crate::protocol::ServerMessage;

/// Cloneable sending half of a connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    /// Process-unique connection ID
    id: u64,

    /// Outbound channel drained by the connection's writer task
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ConnectionHandle {
    /// Create a handle backed by an existing sender
    pub fn new(id: u64, tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { id, tx }
    }

    /// Create a handle together with the receiving half of its channel
    pub fn channel(id: u64) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, tx), rx)
    }

    /// Process-unique connection ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue a message for delivery
    ///
    /// Returns `false` if the connection's writer is gone; the message is
    /// dropped, never queued or retried.
    pub fn send(&self, msg: ServerMessage) -> bool {
        if self.tx.send(msg).is_err() {
            tracing::debug!(conn_id = self.id, "Dropped message for closed connection");
            false
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_delivers_to_receiver() {
        let (handle, mut rx) = ConnectionHandle::channel(1);

        assert!(handle.send(ServerMessage::BroadcasterAvailable));
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::BroadcasterAvailable);
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (handle, rx) = ConnectionHandle::channel(1);
        drop(rx);

        assert!(!handle.send(ServerMessage::BroadcasterLeft));
    }

    #[test]
    fn test_clones_share_channel() {
        let (handle, mut rx) = ConnectionHandle::channel(7);
        let clone = handle.clone();

        assert_eq!(clone.id(), 7);
        assert!(clone.send(ServerMessage::BroadcasterAvailable));
        assert!(rx.try_recv().is_ok());
    }
}
