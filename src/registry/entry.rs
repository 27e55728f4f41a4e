//! Per-stream session state
//!
//! This module defines the per-stream state stored in the registry: at most
//! one broadcaster handle and the set of viewer handles keyed by their
//! server-assigned IDs.

use std::collections::HashMap;

use crate::session::ConnectionHandle;

/// Entry for a single stream in the registry
///
/// Invariant (enforced by [`StreamRegistry`](super::StreamRegistry)): an
/// entry exists in the registry iff it has a broadcaster or at least one
/// viewer. Empty entries are removed immediately, with no grace period.
#[derive(Debug, Default)]
pub struct StreamSession {
    /// Current broadcaster connection (None if no broadcaster)
    pub(super) broadcaster: Option<ConnectionHandle>,

    /// Viewer connections keyed by server-assigned viewer ID
    pub(super) viewers: HashMap<String, ConnectionHandle>,
}

impl StreamSession {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Whether the session has an active broadcaster
    pub fn has_broadcaster(&self) -> bool {
        self.broadcaster.is_some()
    }

    /// Number of registered viewers
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// Whether the session holds no connections and should be removed
    pub fn is_empty(&self) -> bool {
        self.broadcaster.is_none() && self.viewers.is_empty()
    }

    /// Snapshot of current viewers for notification fan-out
    pub(super) fn viewer_handles(&self) -> Vec<(String, ConnectionHandle)> {
        self.viewers
            .iter()
            .map(|(id, handle)| (id.clone(), handle.clone()))
            .collect()
    }
}

/// Point-in-time statistics for a stream session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// Number of registered viewers
    pub viewer_count: usize,
    /// Whether the session has a broadcaster
    pub has_broadcaster: bool,
}
