//! Stream registry implementation
//!
//! The central registry tracking who is broadcasting and viewing which
//! stream right now. It is the single shared mutable resource in the
//! process.
//!
//! One coarse mutex guards the whole map: contention is negligible at the
//! expected scale (one broadcaster, a modest viewer count per stream), and a
//! single lock keeps each operation an atomic unit with respect to
//! concurrent joins and disconnects. Mutating operations therefore return
//! the handles the caller must notify, so registration and the notification
//! snapshot cannot interleave with another join.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use super::entry::{SessionStats, StreamSession};
use crate::session::{ConnectionHandle, ConnectionState};

/// Central registry for all active stream sessions
pub struct StreamRegistry {
    /// Map of stream ID to session entry
    streams: Mutex<HashMap<String, StreamSession>>,

    /// Monotonic source of viewer IDs, never reused for the process lifetime
    next_viewer_id: AtomicU64,
}

impl StreamRegistry {
    /// Create a new, empty registry
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
            next_viewer_id: AtomicU64::new(1),
        }
    }

    /// Register a connection as the broadcaster of a stream
    ///
    /// Creates the session if absent. A prior broadcaster reference is
    /// silently overwritten; the displaced connection is not notified
    /// (preserved reconnect-flow behavior, see DESIGN.md).
    ///
    /// Returns the current viewers so the caller can send each one a
    /// `broadcaster-available` notification. Always succeeds.
    pub async fn register_broadcaster(
        &self,
        stream_id: &str,
        conn: ConnectionHandle,
    ) -> Vec<(String, ConnectionHandle)> {
        let mut streams = self.streams.lock().await;

        let entry = streams
            .entry(stream_id.to_string())
            .or_insert_with(StreamSession::new);

        let replaced = entry.broadcaster.replace(conn).is_some();

        tracing::info!(
            stream = %stream_id,
            viewers = entry.viewer_count(),
            replaced = replaced,
            "Broadcaster registered"
        );

        entry.viewer_handles()
    }

    /// Register a connection as a viewer of a stream
    ///
    /// Creates the session if absent and assigns a fresh, process-unique
    /// viewer ID. Returns the ID together with the stream's broadcaster, if
    /// one is present, so the caller can notify the new viewer immediately.
    pub async fn register_viewer(
        &self,
        stream_id: &str,
        conn: ConnectionHandle,
    ) -> (String, Option<ConnectionHandle>) {
        let viewer_id = self.next_viewer_id.fetch_add(1, Ordering::Relaxed).to_string();

        let mut streams = self.streams.lock().await;

        let entry = streams
            .entry(stream_id.to_string())
            .or_insert_with(StreamSession::new);

        entry.viewers.insert(viewer_id.clone(), conn);

        tracing::info!(
            stream = %stream_id,
            viewer_id = %viewer_id,
            viewers = entry.viewer_count(),
            has_broadcaster = entry.has_broadcaster(),
            "Viewer registered"
        );

        (viewer_id, entry.broadcaster.clone())
    }

    /// Remove a connection from its stream session
    ///
    /// Uses the connection's recorded role to decide what to remove. The
    /// broadcaster slot is only cleared when it still refers to this
    /// connection — a broadcaster displaced by a replacement join must not
    /// evict its successor when its own transport finally closes.
    ///
    /// Removes the session entirely once it holds no connections. Idempotent;
    /// a no-op for unjoined connections.
    ///
    /// Returns the remaining viewers when an active broadcaster was removed
    /// (each owed one `broadcaster-left`), and an empty vec otherwise.
    pub async fn unregister(
        &self,
        conn_id: u64,
        state: &ConnectionState,
    ) -> Vec<(String, ConnectionHandle)> {
        let mut streams = self.streams.lock().await;

        let (stream_id, to_notify) = match state {
            ConnectionState::Unjoined => return Vec::new(),

            ConnectionState::Broadcaster { stream_id } => {
                let Some(entry) = streams.get_mut(stream_id) else {
                    return Vec::new();
                };

                let is_current = entry
                    .broadcaster
                    .as_ref()
                    .is_some_and(|current| current.id() == conn_id);

                if is_current {
                    entry.broadcaster = None;
                    let viewers = entry.viewer_handles();

                    tracing::info!(
                        stream = %stream_id,
                        conn_id = conn_id,
                        viewers = viewers.len(),
                        "Broadcaster unregistered"
                    );

                    (stream_id, viewers)
                } else {
                    // Already replaced by a newer broadcaster; leave the
                    // session untouched.
                    tracing::debug!(
                        stream = %stream_id,
                        conn_id = conn_id,
                        "Stale broadcaster unregister ignored"
                    );
                    return Vec::new();
                }
            }

            ConnectionState::Viewer {
                stream_id,
                viewer_id,
            } => {
                let Some(entry) = streams.get_mut(stream_id) else {
                    return Vec::new();
                };

                if entry.viewers.remove(viewer_id).is_some() {
                    tracing::info!(
                        stream = %stream_id,
                        viewer_id = %viewer_id,
                        viewers = entry.viewer_count(),
                        "Viewer unregistered"
                    );
                }

                (stream_id, Vec::new())
            }
        };

        if streams.get(stream_id).is_some_and(|entry| entry.is_empty()) {
            streams.remove(stream_id);
            tracing::info!(stream = %stream_id, "Stream session removed");
        }

        to_notify
    }

    /// Get the broadcaster of a stream, if any
    pub async fn broadcaster(&self, stream_id: &str) -> Option<ConnectionHandle> {
        let streams = self.streams.lock().await;
        streams.get(stream_id).and_then(|entry| entry.broadcaster.clone())
    }

    /// Get a specific viewer of a stream, if still registered
    pub async fn viewer(&self, stream_id: &str, viewer_id: &str) -> Option<ConnectionHandle> {
        let streams = self.streams.lock().await;
        streams
            .get(stream_id)
            .and_then(|entry| entry.viewers.get(viewer_id).cloned())
    }

    /// Get all current viewers of a stream
    ///
    /// Returns an empty vec if the session does not exist.
    pub async fn viewers(&self, stream_id: &str) -> Vec<(String, ConnectionHandle)> {
        let streams = self.streams.lock().await;
        streams
            .get(stream_id)
            .map(|entry| entry.viewer_handles())
            .unwrap_or_default()
    }

    /// Get statistics for one stream session
    pub async fn session_stats(&self, stream_id: &str) -> Option<SessionStats> {
        let streams = self.streams.lock().await;
        streams.get(stream_id).map(|entry| SessionStats {
            viewer_count: entry.viewer_count(),
            has_broadcaster: entry.has_broadcaster(),
        })
    }

    /// Total number of live stream sessions
    pub async fn session_count(&self) -> usize {
        self.streams.lock().await.len()
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: u64) -> ConnectionHandle {
        ConnectionHandle::channel(id).0
    }

    fn broadcaster_state(stream_id: &str) -> ConnectionState {
        ConnectionState::Broadcaster {
            stream_id: stream_id.to_string(),
        }
    }

    fn viewer_state(stream_id: &str, viewer_id: &str) -> ConnectionState {
        ConnectionState::Viewer {
            stream_id: stream_id.to_string(),
            viewer_id: viewer_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_broadcaster_creates_session() {
        let registry = StreamRegistry::new();

        let viewers = registry.register_broadcaster("room-1", handle(1)).await;

        assert!(viewers.is_empty());
        assert_eq!(registry.session_count().await, 1);
        assert!(registry.broadcaster("room-1").await.is_some());
    }

    #[tokio::test]
    async fn test_register_broadcaster_returns_existing_viewers() {
        let registry = StreamRegistry::new();

        registry.register_viewer("room-1", handle(1)).await;
        registry.register_viewer("room-1", handle(2)).await;

        let viewers = registry.register_broadcaster("room-1", handle(3)).await;
        assert_eq!(viewers.len(), 2);
    }

    #[tokio::test]
    async fn test_broadcaster_replacement_keeps_single_broadcaster() {
        let registry = StreamRegistry::new();

        registry.register_broadcaster("room-1", handle(1)).await;
        registry.register_broadcaster("room-1", handle(2)).await;

        let current = registry.broadcaster("room-1").await.unwrap();
        assert_eq!(current.id(), 2);
        assert_eq!(registry.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_register_viewer_returns_broadcaster_when_present() {
        let registry = StreamRegistry::new();

        let (_, broadcaster) = registry.register_viewer("room-1", handle(1)).await;
        assert!(broadcaster.is_none());

        registry.register_broadcaster("room-1", handle(2)).await;

        let (_, broadcaster) = registry.register_viewer("room-1", handle(3)).await;
        assert_eq!(broadcaster.unwrap().id(), 2);
    }

    #[tokio::test]
    async fn test_viewer_ids_are_distinct() {
        let registry = StreamRegistry::new();

        let (id_a, _) = registry.register_viewer("room-1", handle(1)).await;
        let (id_b, _) = registry.register_viewer("room-1", handle(2)).await;

        assert_ne!(id_a, id_b);
    }

    #[tokio::test]
    async fn test_viewer_ids_unique_across_streams() {
        let registry = StreamRegistry::new();

        let (id_a, _) = registry.register_viewer("room-1", handle(1)).await;
        let (id_b, _) = registry.register_viewer("room-2", handle(2)).await;

        assert_ne!(id_a, id_b);
    }

    #[tokio::test]
    async fn test_unregister_broadcaster_returns_remaining_viewers() {
        let registry = StreamRegistry::new();

        registry.register_broadcaster("room-1", handle(1)).await;
        registry.register_viewer("room-1", handle(2)).await;

        let to_notify = registry.unregister(1, &broadcaster_state("room-1")).await;

        assert_eq!(to_notify.len(), 1);
        assert!(registry.broadcaster("room-1").await.is_none());
        // Session survives: it still has a viewer
        assert_eq!(registry.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_empty_session_is_removed() {
        let registry = StreamRegistry::new();

        registry.register_broadcaster("room-1", handle(1)).await;
        let (viewer_id, _) = registry.register_viewer("room-1", handle(2)).await;

        registry.unregister(1, &broadcaster_state("room-1")).await;
        assert_eq!(registry.session_count().await, 1);

        registry
            .unregister(2, &viewer_state("room-1", &viewer_id))
            .await;
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_rejoin_after_teardown_starts_from_empty_state() {
        let registry = StreamRegistry::new();

        registry.register_broadcaster("room-1", handle(1)).await;
        let (viewer_id, _) = registry.register_viewer("room-1", handle(2)).await;

        registry
            .unregister(2, &viewer_state("room-1", &viewer_id))
            .await;
        registry.unregister(1, &broadcaster_state("room-1")).await;
        assert_eq!(registry.session_count().await, 0);

        // A fresh join re-creates the session rather than reusing stale data
        let viewers = registry.register_broadcaster("room-1", handle(3)).await;
        assert!(viewers.is_empty());

        let stats = registry.session_stats("room-1").await.unwrap();
        assert_eq!(stats.viewer_count, 0);
        assert!(stats.has_broadcaster);
    }

    #[tokio::test]
    async fn test_stale_broadcaster_unregister_keeps_replacement() {
        let registry = StreamRegistry::new();

        registry.register_broadcaster("room-1", handle(1)).await;
        registry.register_viewer("room-1", handle(2)).await;
        registry.register_broadcaster("room-1", handle(3)).await;

        // The displaced broadcaster's transport closes after replacement
        let to_notify = registry.unregister(1, &broadcaster_state("room-1")).await;

        assert!(to_notify.is_empty());
        assert_eq!(registry.broadcaster("room-1").await.unwrap().id(), 3);
    }

    #[tokio::test]
    async fn test_unregister_unjoined_is_noop() {
        let registry = StreamRegistry::new();

        registry.register_broadcaster("room-1", handle(1)).await;

        let to_notify = registry.unregister(99, &ConnectionState::Unjoined).await;

        assert!(to_notify.is_empty());
        assert_eq!(registry.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = StreamRegistry::new();

        registry.register_broadcaster("room-1", handle(1)).await;
        registry.register_viewer("room-1", handle(2)).await;

        let state = broadcaster_state("room-1");
        let first = registry.unregister(1, &state).await;
        let second = registry.unregister(1, &state).await;

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_viewer_lookup() {
        let registry = StreamRegistry::new();

        let (viewer_id, _) = registry.register_viewer("room-1", handle(5)).await;

        let found = registry.viewer("room-1", &viewer_id).await.unwrap();
        assert_eq!(found.id(), 5);

        assert!(registry.viewer("room-1", "no-such-id").await.is_none());
        assert!(registry.viewer("no-such-stream", &viewer_id).await.is_none());
    }

    #[tokio::test]
    async fn test_viewers_of_missing_stream_is_empty() {
        let registry = StreamRegistry::new();
        assert!(registry.viewers("nowhere").await.is_empty());
    }
}
