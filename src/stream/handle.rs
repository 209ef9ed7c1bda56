//! Subscription handles.

use super::StreamKind;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

type CancelHook = Box<dyn FnOnce() + Send>;

struct Inner {
    id: Uuid,
    kind: StreamKind,
    closed: AtomicBool,
    on_cancel: Mutex<Option<CancelHook>>,
}

/// Opaque token for one live subscription.
///
/// Clones share state: cancelling any clone closes them all. Cancellation is
/// idempotent and runs the transport's cancel hook at most once.
#[derive(Clone)]
pub struct StreamHandle {
    inner: Arc<Inner>,
}

impl StreamHandle {
    /// Create a handle whose cancellation invokes `on_cancel`.
    pub fn new(kind: StreamKind, on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self::build(kind, Some(Box::new(on_cancel)))
    }

    /// Create a handle with no transport behind it.
    pub fn detached(kind: StreamKind) -> Self {
        Self::build(kind, None)
    }

    fn build(kind: StreamKind, on_cancel: Option<CancelHook>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                kind,
                closed: AtomicBool::new(false),
                on_cancel: Mutex::new(on_cancel),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn kind(&self) -> StreamKind {
        self.inner.kind
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Close the subscription. Returns `true` only for the call that closed it.
    pub fn cancel(&self) -> bool {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let hook = self.inner.on_cancel.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        true
    }
}

impl PartialEq for StreamHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for StreamHandle {}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("closed", &self.is_closed())
            .finish()
    }
}
