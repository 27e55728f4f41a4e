//! Per-connection read/write pump
//!
//! Each accepted socket gets one `Connection`: a reader loop that parses
//! inbound frames and hands them to the router in arrival order, and a
//! writer task draining the connection's outbound channel into the WebSocket
//! sink. Whatever ends the connection first (close frame, transport error,
//! EOF) funnels into the same disconnect path.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;

use crate::error::Result;
use crate::protocol::ClientMessage;
use crate::server::router::MessageRouter;
use crate::session::{ConnectionHandle, ConnectionState};

/// A single relay connection
pub struct Connection {
    id: u64,
    peer_addr: SocketAddr,
    socket: TcpStream,
    router: Arc<MessageRouter>,
}

impl Connection {
    /// Wrap an accepted socket
    pub fn new(id: u64, socket: TcpStream, peer_addr: SocketAddr, router: Arc<MessageRouter>) -> Self {
        Self {
            id,
            peer_addr,
            socket,
            router,
        }
    }

    /// Run the connection until the peer goes away
    ///
    /// Performs the WebSocket handshake, then pumps messages. Registry
    /// cleanup is guaranteed to run on every exit path that follows a
    /// successful handshake.
    pub async fn run(self) -> Result<()> {
        let ws = tokio_tungstenite::accept_async(self.socket).await?;
        let (mut sink, mut stream) = ws.split();

        let (handle, mut outbound) = ConnectionHandle::channel(self.id);

        // Writer task: serialize and flush outbound messages. Ends when the
        // channel closes (all handles dropped) or the sink errors.
        let writer = tokio::spawn(async move {
            while let Some(msg) = outbound.recv().await {
                let text = match serde_json::to_string(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize outbound message");
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let mut state = ConnectionState::Unjoined;

        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => {
                        self.router.handle_message(&handle, &mut state, msg).await;
                    }
                    Err(e) => {
                        // Protocol error: log and ignore, keep the connection
                        tracing::warn!(
                            conn_id = self.id,
                            peer = %self.peer_addr,
                            error = %e,
                            "Ignoring malformed message"
                        );
                    }
                },
                Ok(Message::Close(_)) => break,
                Ok(Message::Binary(_)) => {
                    tracing::debug!(conn_id = self.id, "Ignoring binary frame");
                }
                Ok(_) => {} // Ping/pong handled by tungstenite
                Err(e) => {
                    tracing::debug!(
                        conn_id = self.id,
                        peer = %self.peer_addr,
                        error = %e,
                        "Transport error"
                    );
                    break;
                }
            }
        }

        self.router.handle_disconnect(&handle, &state).await;

        // All handle clones are out of the registry now; dropping ours closes
        // the channel and lets the writer flush and finish.
        drop(handle);
        let _ = writer.await;

        Ok(())
    }
}
