//! Connection role state machine
//!
//! Each connection starts unjoined and transitions exactly once on its first
//! valid join message. Modelling the role as a single enum keeps impossible
//! combinations (a viewer ID without a viewer role, a role without a stream)
//! unrepresentable.

/// Declared role of a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connected, no join message seen yet
    Unjoined,

    /// Joined as the broadcaster of `stream_id`
    Broadcaster { stream_id: String },

    /// Joined as a viewer of `stream_id` under a server-assigned ID
    Viewer { stream_id: String, viewer_id: String },
}

impl ConnectionState {
    /// Whether the connection has declared a role
    pub fn is_joined(&self) -> bool {
        !matches!(self, ConnectionState::Unjoined)
    }

    /// The stream this connection belongs to, if joined
    pub fn stream_id(&self) -> Option<&str> {
        match self {
            ConnectionState::Unjoined => None,
            ConnectionState::Broadcaster { stream_id } => Some(stream_id),
            ConnectionState::Viewer { stream_id, .. } => Some(stream_id),
        }
    }

    /// Role name for log fields
    pub fn role(&self) -> &'static str {
        match self {
            ConnectionState::Unjoined => "unjoined",
            ConnectionState::Broadcaster { .. } => "broadcaster",
            ConnectionState::Viewer { .. } => "viewer",
        }
    }
}
