use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::store::{StageState, Store};

/// Thread-safe handle to one [`Store`]. Every operation runs under a single lock,
/// so callers on different threads still see whole transitions only.
#[derive(Clone, Debug, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> StageState {
        self.lock().snapshot()
    }

    // Operations never leave a half-applied state, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
