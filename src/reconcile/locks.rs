use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::locator::DayKey;

/// Exclusive locks scoped to a day key. A key's slot lives only while some
/// caller holds or waits for it.
#[derive(Default)]
pub struct KeyLocks {
    slots: Mutex<HashMap<DayKey, Arc<AsyncMutex<()>>>>,
}

/// Held for the whole locate → write sequence of one day key.
pub struct KeyGuard<'a> {
    // Field order matters: the mutex is released before the slot is checked.
    _guard: OwnedMutexGuard<()>,
    _slot: Slot<'a>,
}

/// A caller's handle on a key's map entry, holding or waiting. Dropping the
/// last handle removes the entry, including when the wait is cancelled.
struct Slot<'a> {
    locks: &'a KeyLocks,
    key: DayKey,
    mutex: Option<Arc<AsyncMutex<()>>>,
}

impl KeyLocks {
    pub async fn acquire(&self, key: DayKey) -> KeyGuard<'_> {
        let mutex = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(key.clone()).or_default().clone()
        };
        let slot = Slot {
            locks: self,
            key,
            mutex: Some(mutex.clone()),
        };
        let guard = mutex.lock_owned().await;

        KeyGuard {
            _guard: guard,
            _slot: slot,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.mutex.take();

        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Only the map's own handle left: nobody holds or waits for this key.
        if slots
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            slots.remove(&self.key);
        }
    }
}
