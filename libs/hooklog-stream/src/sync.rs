use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

// A panicking handler never holds one of these locks, so the protected data
// stays consistent and a poisoned lock is safe to keep using.

pub(crate) fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(g) => g,
        Err(poisoned) => {
            tracing::warn!(lock = what, "read lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

pub(crate) fn write<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(g) => g,
        Err(poisoned) => {
            tracing::warn!(lock = what, "write lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

pub(crate) fn lock<'a, T>(lock: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(g) => g,
        Err(poisoned) => {
            tracing::warn!(lock = what, "mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
