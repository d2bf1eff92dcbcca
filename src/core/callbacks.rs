use crate::domain::model::{CallbackEvent, SteamCallback};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Handler = Arc<dyn Fn(&CallbackEvent) + Send + Sync>;

/// Handlers keyed by callback kind, fed by the callback pump.
#[derive(Default)]
pub struct CallbackRegistry {
    handlers: Mutex<HashMap<SteamCallback, Vec<(u64, Handler)>>>,
    next_id: AtomicU64,
}

impl CallbackRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register<F>(self: &Arc<Self>, kind: SteamCallback, handler: F) -> CallbackHandle
    where
        F: Fn(&CallbackEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .lock()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        tracing::debug!("Registered handler {} for {:?}", id, kind);

        CallbackHandle {
            registry: Arc::downgrade(self),
            kind,
            id,
        }
    }

    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &CallbackEvent) -> usize {
        // Cloned out so handlers may register or disconnect while running.
        let handlers: Vec<Handler> = match self.handlers.lock().get(&event.kind) {
            Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return 0,
        };

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn handler_count(&self, kind: SteamCallback) -> usize {
        self.handlers.lock().get(&kind).map_or(0, Vec::len)
    }

    fn remove(&self, kind: SteamCallback, id: u64) -> bool {
        let mut handlers = self.handlers.lock();
        let Some(list) = handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(handler_id, _)| *handler_id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            handlers.remove(&kind);
        }
        removed
    }
}

/// Registration returned by [`CallbackRegistry::register`].
///
/// Dropping the handle leaves the handler registered; call `disconnect`.
#[derive(Debug, Clone)]
pub struct CallbackHandle {
    registry: Weak<CallbackRegistry>,
    kind: SteamCallback,
    id: u64,
}

impl CallbackHandle {
    pub fn kind(&self) -> SteamCallback {
        self.kind
    }

    /// Returns false when the handler was already gone.
    pub fn disconnect(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.remove(self.kind, self.id),
            None => false,
        }
    }
}
