//! Named, observable configuration values.
//!
//! [`OptionsMonitor`] holds named snapshots of a configuration type and
//! notifies subscribers when a snapshot is replaced. Components that react to
//! live configuration changes register a listener with
//! [`on_change`](OptionsMonitor::on_change), filter on the name they were
//! constructed with, and swap their internal state when it fires.
//!
//! Snapshots are immutable once published: [`set`](OptionsMonitor::set)
//! replaces the whole value under a name rather than mutating it in place,
//! so concurrent readers see either the old or the new snapshot, never a
//! partially updated one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

/// Name of the default configuration instance.
///
/// Components that are not multi-instance read and watch this name.
pub const DEFAULT_NAME: &str = "";

type Listener<T> = Box<dyn Fn(&T, &str) + Send + Sync>;

struct MonitorShared<T> {
    values: RwLock<HashMap<String, Arc<T>>>,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_listener_id: AtomicU64,
}

/// Named configuration snapshots with change notification.
///
/// Cloning is cheap and clones share the same underlying state, so a monitor
/// can be handed to every component that needs to observe it.
pub struct OptionsMonitor<T> {
    shared: Arc<MonitorShared<T>>,
}

impl<T> Clone for OptionsMonitor<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for OptionsMonitor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OptionsMonitor<T> {
    /// Create a monitor with no snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(MonitorShared {
                values: RwLock::new(HashMap::new()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// Create a monitor seeded with a value under [`DEFAULT_NAME`].
    #[must_use]
    pub fn with_default(value: T) -> Self {
        Self::new().with_named(DEFAULT_NAME, value)
    }

    /// Seed a named snapshot without notifying listeners (builder form).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_named(self, name: impl Into<String>, value: T) -> Self {
        self.shared
            .values
            .write()
            .unwrap()
            .insert(name.into(), Arc::new(value));
        self
    }

    /// Get the current snapshot under `name`, if one exists.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.shared.values.read().unwrap().get(name).cloned()
    }

    /// Get the current snapshot under [`DEFAULT_NAME`], if one exists.
    #[must_use]
    pub fn current(&self) -> Option<Arc<T>> {
        self.get(DEFAULT_NAME)
    }

    /// Replace the snapshot under `name` and notify all listeners.
    ///
    /// Listeners run on the calling thread, after the new snapshot is
    /// visible to readers. A listener must not call back into the monitor.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set(&self, name: impl Into<String>, value: T) {
        let name = name.into();
        let value = Arc::new(value);
        self.shared
            .values
            .write()
            .unwrap()
            .insert(name.clone(), Arc::clone(&value));

        let listeners = self.shared.listeners.lock().unwrap();
        for (_, listener) in listeners.iter() {
            listener(&value, &name);
        }
    }

    /// Register a change listener.
    ///
    /// The listener receives the new value and the name it was published
    /// under; listeners interested in a single name filter on it. The
    /// listener stays registered until the returned subscription is dropped.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn on_change(
        &self,
        listener: impl Fn(&T, &str) + Send + Sync + 'static,
    ) -> ChangeSubscription<T> {
        let id = self.shared.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.shared
            .listeners
            .lock()
            .unwrap()
            .push((id, Box::new(listener)));
        ChangeSubscription {
            shared: Arc::downgrade(&self.shared),
            id,
        }
    }
}

/// Handle for a registered change listener.
///
/// Uses RAII - dropping the subscription unregisters the listener. Keep it
/// alive for as long as change notifications should be delivered.
#[derive(Debug)]
pub struct ChangeSubscription<T> {
    shared: Weak<MonitorShared<T>>,
    id: u64,
}

impl<T> Drop for ChangeSubscription<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade()
            && let Ok(mut listeners) = shared.listeners.lock()
        {
            listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
