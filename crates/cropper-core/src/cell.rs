//! Synchronized value cells shared between the gesture side and crop requests.
//!
//! A cell has a single writer by convention (the component that owns the
//! value); any number of readers may hold clones.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A cloneable handle to a value behind a read-write lock.
pub struct SharedValue<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> SharedValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    pub fn set(&self, value: T) {
        *self.inner.write() = value;
    }

    /// Read under the lock without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.read())
    }
}

impl<T: Clone> SharedValue<T> {
    pub fn get(&self) -> T {
        self.inner.read().clone()
    }
}

impl<T> Clone for SharedValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for SharedValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedValue").field(&*self.inner.read()).finish()
    }
}
