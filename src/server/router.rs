//! Message router
//!
//! Classifies every inbound message from a connection and either updates the
//! registry (joins) or forwards a payload to the correct peer(s). The relay
//! is permissive: malformed or out-of-state messages are logged and ignored,
//! never grounds for closing the connection. Routing misses (target gone,
//! broadcaster absent) are expected races and dropped silently.

use std::sync::Arc;

use serde_json::Value;

use crate::protocol::{ClientMessage, ServerMessage, SignalKind};
use crate::registry::StreamRegistry;
use crate::session::{ConnectionHandle, ConnectionState};
use crate::stats::RelayStats;

/// Per-message routing logic shared by all connections
pub struct MessageRouter {
    registry: Arc<StreamRegistry>,
    stats: Arc<RelayStats>,
}

impl MessageRouter {
    /// Create a router over the given registry
    pub fn new(registry: Arc<StreamRegistry>) -> Self {
        Self {
            registry,
            stats: Arc::new(RelayStats::new()),
        }
    }

    /// The registry this router mutates
    pub fn registry(&self) -> &Arc<StreamRegistry> {
        &self.registry
    }

    /// Server-wide counters
    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }

    /// Handle one inbound message from a connection
    ///
    /// Runs to completion per message; message order from a single connection
    /// is preserved by the caller's read loop.
    pub async fn handle_message(
        &self,
        conn: &ConnectionHandle,
        state: &mut ConnectionState,
        msg: ClientMessage,
    ) {
        match msg {
            ClientMessage::JoinAsBroadcaster { stream_id } => {
                self.join_as_broadcaster(conn, state, stream_id).await;
            }
            ClientMessage::JoinAsViewer { stream_id } => {
                self.join_as_viewer(conn, state, stream_id).await;
            }
            ClientMessage::RequestStream => {
                self.request_stream(conn, state).await;
            }
            ClientMessage::Offer {
                data,
                target_viewer_id,
            } => {
                self.relay_signal(conn, state, SignalKind::Offer, data, target_viewer_id)
                    .await;
            }
            ClientMessage::Answer {
                data,
                target_viewer_id,
            } => {
                self.relay_signal(conn, state, SignalKind::Answer, data, target_viewer_id)
                    .await;
            }
            ClientMessage::IceCandidate {
                data,
                target_viewer_id,
            } => {
                self.relay_signal(conn, state, SignalKind::IceCandidate, data, target_viewer_id)
                    .await;
            }
        }
    }

    /// Handle transport-level close, error, or timeout (treated identically)
    pub async fn handle_disconnect(&self, conn: &ConnectionHandle, state: &ConnectionState) {
        let to_notify = self.registry.unregister(conn.id(), state).await;

        // Non-empty only when an active broadcaster was removed: every
        // remaining viewer gets exactly one broadcaster-left. Viewer
        // departures notify nobody.
        for (viewer_id, viewer) in to_notify {
            if viewer.send(ServerMessage::BroadcasterLeft) {
                self.stats.message_routed();
            } else {
                tracing::debug!(viewer_id = %viewer_id, "broadcaster-left not delivered");
                self.stats.message_dropped();
            }
        }
    }

    async fn join_as_broadcaster(
        &self,
        conn: &ConnectionHandle,
        state: &mut ConnectionState,
        stream_id: String,
    ) {
        if state.is_joined() {
            // A connection cannot rejoin without disconnecting first
            tracing::warn!(
                conn_id = conn.id(),
                role = state.role(),
                "Ignoring join-as-broadcaster from joined connection"
            );
            return;
        }

        let viewers = self
            .registry
            .register_broadcaster(&stream_id, conn.clone())
            .await;

        // Existing viewers learn the broadcaster is (newly or again) present
        for (viewer_id, viewer) in viewers {
            if viewer.send(ServerMessage::BroadcasterAvailable) {
                self.stats.message_routed();
            } else {
                tracing::debug!(viewer_id = %viewer_id, "broadcaster-available not delivered");
                self.stats.message_dropped();
            }
        }

        *state = ConnectionState::Broadcaster { stream_id };
    }

    async fn join_as_viewer(
        &self,
        conn: &ConnectionHandle,
        state: &mut ConnectionState,
        stream_id: String,
    ) {
        if state.is_joined() {
            tracing::warn!(
                conn_id = conn.id(),
                role = state.role(),
                "Ignoring join-as-viewer from joined connection"
            );
            return;
        }

        let (viewer_id, broadcaster) = self
            .registry
            .register_viewer(&stream_id, conn.clone())
            .await;

        // A late-joining viewer learns immediately instead of polling
        if broadcaster.is_some() && conn.send(ServerMessage::BroadcasterAvailable) {
            self.stats.message_routed();
        }

        *state = ConnectionState::Viewer {
            stream_id,
            viewer_id,
        };
    }

    async fn request_stream(&self, conn: &ConnectionHandle, state: &ConnectionState) {
        let ConnectionState::Viewer {
            stream_id,
            viewer_id,
        } = state
        else {
            tracing::debug!(
                conn_id = conn.id(),
                role = state.role(),
                "Ignoring request-stream from non-viewer"
            );
            return;
        };

        match self.registry.broadcaster(stream_id).await {
            Some(broadcaster) => {
                let delivered = broadcaster.send(ServerMessage::ViewerRequest {
                    viewer_id: viewer_id.clone(),
                });
                if delivered {
                    self.stats.message_routed();
                } else {
                    self.stats.message_dropped();
                }
            }
            None => {
                // Viewer retries or waits for broadcaster-available
                tracing::debug!(
                    stream = %stream_id,
                    viewer_id = %viewer_id,
                    "request-stream with no broadcaster, dropped"
                );
                self.stats.message_dropped();
            }
        }
    }

    /// Forward an opaque signaling payload per the sender's role
    async fn relay_signal(
        &self,
        conn: &ConnectionHandle,
        state: &ConnectionState,
        kind: SignalKind,
        data: Value,
        target_viewer_id: Option<String>,
    ) {
        match state {
            ConnectionState::Broadcaster { stream_id } => match target_viewer_id {
                Some(target) => {
                    // Single-target delivery; the viewer may have disconnected
                    // mid-negotiation, which is not an error
                    match self.registry.viewer(stream_id, &target).await {
                        Some(viewer) => {
                            if viewer.send(ServerMessage::signal(kind, data, None)) {
                                self.stats.message_routed();
                            } else {
                                self.stats.message_dropped();
                            }
                        }
                        None => {
                            tracing::debug!(
                                stream = %stream_id,
                                target = %target,
                                kind = %kind,
                                "Target viewer gone, dropped"
                            );
                            self.stats.message_dropped();
                        }
                    }
                }
                None => {
                    // Fan-out to every current viewer of this stream
                    for (_, viewer) in self.registry.viewers(stream_id).await {
                        if viewer.send(ServerMessage::signal(kind, data.clone(), None)) {
                            self.stats.message_routed();
                        } else {
                            self.stats.message_dropped();
                        }
                    }
                }
            },

            ConnectionState::Viewer {
                stream_id,
                viewer_id,
            } => match self.registry.broadcaster(stream_id).await {
                Some(broadcaster) => {
                    // Inject the sender's own ID so the broadcaster can
                    // address the reply; any client-supplied value was
                    // already discarded at parse time
                    let msg = ServerMessage::signal(kind, data, Some(viewer_id.clone()));
                    if broadcaster.send(msg) {
                        self.stats.message_routed();
                    } else {
                        self.stats.message_dropped();
                    }
                }
                None => {
                    tracing::debug!(
                        stream = %stream_id,
                        viewer_id = %viewer_id,
                        kind = %kind,
                        "No broadcaster for relayed payload, dropped"
                    );
                    self.stats.message_dropped();
                }
            },

            ConnectionState::Unjoined => {
                tracing::debug!(
                    conn_id = conn.id(),
                    kind = %kind,
                    "Ignoring signaling payload from unjoined connection"
                );
            }
        }
    }
}
