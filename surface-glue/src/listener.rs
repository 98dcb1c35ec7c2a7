use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Identifies a registration in a [`ListenerRegistry`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Activity lifecycle callbacks, delivered on the UI thread.
///
/// Every method has an empty default so implementations only override what
/// they care about.
pub trait LifecycleListener: Send + Sync {
    fn on_start(&self) {}
    fn on_resume(&self) {}
    fn on_pause(&self) {}
    fn on_stop(&self) {}
    fn on_destroy(&self) {}
    fn on_low_memory(&self) {}
    fn on_focus_changed(&self, _focused: bool) {}
}

/// An ordered set of listeners.
///
/// Notification iterates over a snapshot, so listeners may register or
/// unregister (themselves or others) from inside a callback; such changes
/// take effect from the next notification.
pub struct ListenerRegistry<L: ?Sized> {
    listeners: Mutex<Vec<(ListenerId, Arc<L>)>>,
    next_id: AtomicU64,
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<L: ?Sized> std::fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl<L: ?Sized> ListenerRegistry<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<L>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().unwrap().push((id, listener));
        id
    }

    /// Returns `false` if `id` was not registered
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut guard = self.listeners.lock().unwrap();
        match guard.iter().position(|(registered, _)| *registered == id) {
            Some(pos) => {
                guard.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn notify<F>(&self, mut f: F)
    where
        F: FnMut(&L),
    {
        let snapshot: Vec<Arc<L>> = self
            .listeners
            .lock()
            .unwrap()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            f(&listener);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
