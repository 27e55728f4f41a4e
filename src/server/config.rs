//! Server configuration

use std::net::SocketAddr;

use crate::error::{RelayError, Result};

/// Environment variable overriding the full bind address
pub const ENV_BIND_ADDR: &str = "RELAY_BIND_ADDR";

/// Environment variable overriding just the listen port
pub const ENV_PORT: &str = "RELAY_PORT";

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8090".parse().unwrap(),
            max_connections: 0, // Unlimited
            tcp_nodelay: true,  // Signaling traffic is small and latency-sensitive
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Build a config from the process environment
    ///
    /// `RELAY_BIND_ADDR` sets the full bind address; otherwise `RELAY_PORT`
    /// overrides the default port. Unset variables fall back to defaults,
    /// unparsable values are configuration errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var(ENV_BIND_ADDR) {
            config.bind_addr = addr
                .parse()
                .map_err(|_| RelayError::Config(format!("bad {ENV_BIND_ADDR}: {addr}")))?;
        } else if let Ok(port) = std::env::var(ENV_PORT) {
            let port: u16 = port
                .parse()
                .map_err(|_| RelayError::Config(format!("bad {ENV_PORT}: {port}")))?;
            config.bind_addr.set_port(port);
        }

        Ok(config)
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 8090);
        assert_eq!(config.max_connections, 0);
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:9001".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .max_connections(50)
            .tcp_nodelay(false);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.max_connections, 50);
        assert!(!config.tcp_nodelay);
    }

    // Single test for all env handling: the variables are process-global and
    // tests run in parallel.
    #[test]
    fn test_from_env() {
        std::env::remove_var(ENV_BIND_ADDR);
        std::env::remove_var(ENV_PORT);
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, ServerConfig::default().bind_addr);

        std::env::set_var(ENV_PORT, "9091");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr.port(), 9091);

        std::env::set_var(ENV_BIND_ADDR, "127.0.0.1:9092");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9092".parse().unwrap());

        std::env::set_var(ENV_BIND_ADDR, "not-an-addr");
        assert!(ServerConfig::from_env().is_err());

        std::env::remove_var(ENV_BIND_ADDR);
        std::env::set_var(ENV_PORT, "not-a-port");
        assert!(ServerConfig::from_env().is_err());

        std::env::remove_var(ENV_PORT);
    }
}
