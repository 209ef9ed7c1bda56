//! Registry of live subscription handles, one slot per stream kind.

use super::{StreamHandle, StreamKind};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Tracks at most one handle per [`StreamKind`].
///
/// [`set`](Self::set) does not cancel the handle it supersedes; callers that
/// need exactly one live stream per kind call
/// [`cancel_if_exists`](Self::cancel_if_exists) first.
#[derive(Debug, Default)]
pub struct StreamManager {
    handles: Mutex<HashMap<StreamKind, StreamHandle>>,
}

impl StreamManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `kind`, returning the superseded handle (still
    /// live if it was live before).
    pub fn set(&self, handle: StreamHandle, kind: StreamKind) -> Option<StreamHandle> {
        let previous = self.handles.lock().insert(kind, handle);
        if let Some(prev) = &previous {
            if !prev.is_closed() {
                tracing::warn!(
                    kind = %kind,
                    handle = %prev.id(),
                    "Superseding a live stream handle without cancelling it"
                );
            }
        }
        previous
    }

    /// Cancel and deregister the handle for `kind`. No-op when absent.
    pub fn cancel_if_exists(&self, kind: StreamKind) -> bool {
        // Release the registry lock before running the transport's cancel hook.
        let removed = self.handles.lock().remove(&kind);
        match removed {
            Some(handle) => {
                handle.cancel();
                tracing::debug!(kind = %kind, handle = %handle.id(), "Stream cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every registered handle. Returns how many were registered.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<StreamHandle> = self.handles.lock().drain().map(|(_, h)| h).collect();
        for handle in &drained {
            handle.cancel();
        }
        if !drained.is_empty() {
            tracing::info!("Cancelled {} stream(s)", drained.len());
        }
        drained.len()
    }

    pub fn get(&self, kind: StreamKind) -> Option<StreamHandle> {
        self.handles.lock().get(&kind).cloned()
    }

    pub fn contains(&self, kind: StreamKind) -> bool {
        self.handles.lock().contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<StreamKind> {
        let mut kinds: Vec<_> = self.handles.lock().keys().copied().collect();
        kinds.sort();
        kinds
    }
}
