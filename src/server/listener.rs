//! Relay server listener
//!
//! Handles the TCP accept loop and spawns a connection task per peer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::registry::StreamRegistry;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::router::MessageRouter;

/// WebSocket signaling relay server
pub struct RelayServer {
    config: ServerConfig,
    router: Arc<MessageRouter>,
    next_conn_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl RelayServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            router: Arc::new(MessageRouter::new(Arc::new(StreamRegistry::new()))),
            next_conn_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the stream registry
    pub fn registry(&self) -> &Arc<StreamRegistry> {
        self.router.registry()
    }

    /// Get a reference to the message router
    pub fn router(&self) -> &Arc<MessageRouter> {
        &self.router
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Signaling relay listening");

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Signaling relay listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    /// Run on an already-bound listener
    ///
    /// Useful for tests that bind port 0 and need the actual address.
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(addr = %addr, "Signaling relay listening");
        }
        self.accept_loop(&listener).await
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: std::net::SocketAddr) {
        // Check connection limit; the permit rides with the task so it is
        // held for the connection's whole lifetime
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(conn_id = conn_id, peer = %peer_addr, "New connection");

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
            }
        }

        let router = Arc::clone(&self.router);
        let stats = Arc::clone(router.stats());

        tokio::spawn(async move {
            let _permit = permit;
            stats.connection_opened();

            let connection = Connection::new(conn_id, socket, peer_addr, router);
            if let Err(e) = connection.run().await {
                tracing::debug!(conn_id = conn_id, error = %e, "Connection error");
            }

            stats.connection_closed();
            tracing::debug!(conn_id = conn_id, "Connection closed");
        });
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> std::net::SocketAddr {
        self.config.bind_addr
    }
}
