//! Listener registration for platform notifications.
//!
//! Every platform object that emits events (device list, permission state,
//! tracks, recorders, orientation, volume) exposes an `on_*` method taking a
//! [`Listener`] and returning a [`Subscription`]. Dropping the subscription
//! detaches the listener.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Callback invoked for each emitted event.
///
/// Listeners may be called from any thread; keep them short. The session
/// only forwards the event into its queue.
pub type Listener<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// Guard for a registered listener. Detaches on drop.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A subscription with nothing to detach.
    pub fn empty() -> Self {
        Self { detach: None }
    }

    /// Detach now instead of at drop.
    pub fn cancel(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

struct RegistryInner<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// A list of listeners for one event kind.
///
/// Cloning shares the list. Backends keep one registry per event kind and
/// call [`EventRegistry::emit`] when the platform reports the event.
pub struct EventRegistry<T> {
    inner: Arc<Mutex<RegistryInner<T>>>,
}

impl<T: Clone + Send + 'static> EventRegistry<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, listener: Listener<T>) -> Subscription {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, listener));
            id
        };

        let weak: Weak<Mutex<RegistryInner<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().listeners.retain(|(other, _)| *other != id);
            }
        })
    }

    /// Deliver `value` to every listener registered at the time of the call.
    ///
    /// The lock is released before listeners run, so a listener may
    /// subscribe or detach without deadlocking.
    pub fn emit(&self, value: T) {
        let listeners: Vec<Listener<T>> = self
            .inner
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + 'static> Default for EventRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
