//! Per-kind in-flight guard for reconciliation.

use crate::stream::StreamKind;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Set of stream kinds with a validation currently running.
#[derive(Debug, Default)]
pub struct InFlight {
    running: Mutex<HashSet<StreamKind>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `kind`. Returns `None` while another claim on the same kind is alive.
    pub fn try_acquire(&self, kind: StreamKind) -> Option<InFlightGuard<'_>> {
        if self.running.lock().insert(kind) {
            Some(InFlightGuard { owner: self, kind })
        } else {
            None
        }
    }

    pub fn is_running(&self, kind: StreamKind) -> bool {
        self.running.lock().contains(&kind)
    }
}

/// Releases its kind on drop.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    kind: StreamKind,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.running.lock().remove(&self.kind);
    }
}
