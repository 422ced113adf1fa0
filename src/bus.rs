//! Process-wide publish/subscribe channel between views, actions and the push stream.
//!
//! Delivery is synchronous and in registration order. Every handler runs isolated: an error
//! or a panic in one handler is logged and the remaining handlers still run. There are no
//! wildcards and no backpressure.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::actions::ConfirmDialog;
use crate::push::{ConnectionState, PushEvent};
use crate::toast::Toast;
use crate::types::FileEntry;

/// Event names. Each [`BusEvent`] variant belongs to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Toast,
    PushMessage,
    RefetchFiles,
    ConfirmDialog,
    VideoDetails,
    VideoUrl,
    PushStatus,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Toast => "show-toast",
            EventKind::PushMessage => "sse-message",
            EventKind::RefetchFiles => "refetch-files",
            EventKind::ConfirmDialog => "show-confirm-dialog",
            EventKind::VideoDetails => "video-details",
            EventKind::VideoUrl => "video-url",
            EventKind::PushStatus => "sse-status",
        }
    }
}

#[derive(Debug, Clone)]
pub enum BusEvent {
    Toast(Toast),
    /// An accepted (non-heartbeat) push message, raw text plus its parsed meaning.
    PushMessage(PushEvent),
    /// Reload the file list of the current view.
    RefetchFiles,
    ConfirmDialog(ConfirmDialog),
    VideoDetails(FileEntry),
    /// A URL handed over for download or streaming.
    VideoUrl { url: String, stream: bool },
    PushStatus(ConnectionState),
}

impl BusEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BusEvent::Toast(_) => EventKind::Toast,
            BusEvent::PushMessage(_) => EventKind::PushMessage,
            BusEvent::RefetchFiles => EventKind::RefetchFiles,
            BusEvent::ConfirmDialog(_) => EventKind::ConfirmDialog,
            BusEvent::VideoDetails(_) => EventKind::VideoDetails,
            BusEvent::VideoUrl { .. } => EventKind::VideoUrl,
            BusEvent::PushStatus(_) => EventKind::PushStatus,
        }
    }
}

pub type Handler = Arc<dyn Fn(&BusEvent) -> anyhow::Result<()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    handlers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
}

struct Inner {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
}

impl Inner {
    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Handlers never run under the lock, so a poisoned registry is still consistent.
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn remove(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut reg = self.registry();
        let Some(list) = reg.handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sid, _)| *sid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            reg.handlers.remove(&kind);
        }
        removed
    }
}

/// Cheap to clone; all clones share one registry.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner { registry: Mutex::new(Registry::default()), next_id: AtomicU64::new(1) }),
        }
    }

    /// Registers `handler` for `kind`. The handler stays registered until the returned
    /// [`Subscription`] is unsubscribed or dropped.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&BusEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.registry().handlers.entry(kind).or_default().push((id, Arc::new(handler)));
        tracing::trace!(event = kind.as_str(), id = id.0, "handler subscribed");
        Subscription { bus: Arc::downgrade(&self.inner), kind, id, active: true }
    }

    /// Removes one handler. Unknown ids are a no-op; returns whether something was removed.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        self.inner.remove(kind, id)
    }

    /// Invokes every handler currently registered for the event's kind, in order.
    /// Returns how many handlers completed without error.
    pub fn publish(&self, event: BusEvent) -> usize {
        let kind = event.kind();
        // Snapshot so handlers may (un)subscribe while being called.
        let handlers: Vec<(SubscriptionId, Handler)> = match self.inner.registry().handlers.get(&kind) {
            Some(list) => list.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for (id, handler) in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(event = kind.as_str(), id = id.0, "bus handler failed: {:#}", e);
                }
                Err(_) => {
                    tracing::error!(event = kind.as_str(), id = id.0, "bus handler panicked");
                }
            }
        }
        delivered
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.inner.registry().handlers.get(&kind).map(Vec::len).unwrap_or(0)
    }

    /// Drops every registration. Used at application teardown only.
    pub fn clear(&self) {
        self.inner.registry().handlers.clear();
    }
}

/// Unsubscribe capability returned by [`EventBus::subscribe`]. Releases its handler when
/// dropped, so a torn-down view can never be called back.
#[must_use = "dropping a Subscription immediately unsubscribes the handler"]
pub struct Subscription {
    bus: Weak<Inner>,
    kind: EventKind,
    id: SubscriptionId,
    active: bool,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Removes exactly this handler. Calling it on an already cleared bus is a no-op.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(inner) = self.bus.upgrade() {
            inner.remove(self.kind, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("kind", &self.kind).field("id", &self.id).finish()
    }
}
