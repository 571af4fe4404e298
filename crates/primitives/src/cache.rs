//! Lazily computed, write-once values.

use std::sync::OnceLock;

/// Write-once slot for a value derived from immutable chunk contents.
///
/// Chunks never change after construction, so anything hashed from them
/// (BMT reference, SOC address) is computed at most once and shared by clones
/// made after that point.
#[derive(Debug)]
pub(crate) struct OnceCache<T> {
    value: OnceLock<T>,
}

impl<T> OnceCache<T> {
    /// An empty slot
    pub(crate) const fn new() -> Self {
        Self {
            value: OnceLock::new(),
        }
    }

    /// A slot already holding `value`
    pub(crate) fn with_value(value: T) -> Self {
        Self {
            value: OnceLock::from(value),
        }
    }

    /// The value, computing it on first access
    pub(crate) fn get_or_compute(&self, compute: impl FnOnce() -> T) -> &T {
        self.value.get_or_init(compute)
    }
}

impl<T> Default for OnceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for OnceCache<T> {
    fn clone(&self) -> Self {
        self.value
            .get()
            .map_or_else(Self::new, |value| Self::with_value(value.clone()))
    }
}
