//! Swappable cell for live-reloadable component state.

use std::sync::{Arc, RwLock};

/// A concurrency-safe cell holding an `Arc<T>` that is replaced wholesale.
///
/// Change listeners [`store`](Self::store) a new value; operation paths
/// [`load`](Self::load) the value live at their own call time. A load
/// observes either the old or the new `Arc`, never a partially updated
/// value, and a completed store is visible to every subsequent load.
///
/// `T` may be unsized (`SwapCell<dyn Trait>`, `SwapCell<str>`).
#[derive(Debug)]
pub struct SwapCell<T: ?Sized> {
    slot: RwLock<Arc<T>>,
}

impl<T: ?Sized> SwapCell<T> {
    /// Create a cell holding `value`.
    #[must_use]
    pub fn new(value: Arc<T>) -> Self {
        Self {
            slot: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn load(&self) -> Arc<T> {
        Arc::clone(&self.slot.read().unwrap())
    }

    /// Replace the current value.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn store(&self, value: Arc<T>) {
        *self.slot.write().unwrap() = value;
    }
}

impl<T> SwapCell<T> {
    /// Create a cell from a sized value.
    #[must_use]
    pub fn from_value(value: T) -> Self {
        Self::new(Arc::new(value))
    }
}
