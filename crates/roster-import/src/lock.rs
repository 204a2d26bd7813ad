//! Process-wide import locks keyed by store identity.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, Weak};

static STORE_LOCKS: LazyLock<Mutex<HashMap<String, Weak<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Returns the lock serializing imports into the store with `key`.
///
/// Handles to the same storage share a key and therefore a lock. The
/// registry only keeps locks somebody still holds; entries for dropped
/// locks are pruned on the next call.
pub fn store_lock(key: &str) -> Arc<Mutex<()>> {
    let mut locks = STORE_LOCKS
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(lock) = locks.get(key).and_then(Weak::upgrade) {
        return lock;
    }
    locks.retain(|_, lock| lock.strong_count() > 0);
    let lock = Arc::new(Mutex::new(()));
    locks.insert(key.to_string(), Arc::downgrade(&lock));
    lock
}

#[cfg(test)]
fn is_tracked(key: &str) -> bool {
    STORE_LOCKS
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .contains_key(key)
}
