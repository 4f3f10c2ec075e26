//! Per-key mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{EngineError, EngineResult};

/// Hands out one mutex per key.
///
/// Start, end, track and adjust hold the lock of the employee involved for
/// their whole read-check-write sequence. Distinct employees never contend.
#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Returns the mutex for `key`, creating it on first use.
    pub(crate) fn slot(&self, key: &str) -> EngineResult<Arc<Mutex<()>>> {
        let mut slots = self.slots.lock().map_err(|_| EngineError::Storage {
            message: "lock table poisoned".to_string(),
        })?;
        Ok(Arc::clone(slots.entry(key.to_string()).or_default()))
    }

    /// Drops the entry for `key` once `slot` is its only outside holder.
    ///
    /// Handing out a slot takes the table lock, so a holder that arrives
    /// later always finds a fresh entry.
    fn release(&self, key: &str, slot: Arc<Mutex<()>>) {
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };
        let idle = slots
            .get(key)
            .is_some_and(|entry| Arc::ptr_eq(entry, &slot) && Arc::strong_count(&slot) == 2);
        if idle {
            slots.remove(key);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or_default()
    }
}

/// Runs `f` while holding the mutex for `key`.
///
/// The table entry is pruned afterwards when no other caller is waiting on
/// it, so the table only holds keys with work in flight.
pub(crate) fn with_lock<T>(
    locks: &KeyedLocks,
    key: &str,
    f: impl FnOnce() -> EngineResult<T>,
) -> EngineResult<T> {
    let slot = locks.slot(key)?;
    let result = {
        // The mutex guards no data, so poisoning is harmless.
        let _guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f()
    };
    locks.release(key, slot);
    result
}
