use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// [HistoryLock] makes sure only one history fetch runs for a room at a time
///
/// Unlike a plain mutex guard, the lock is released explicitly with [HistoryLock::release],
/// which lets the acquiring and releasing code live in different places.
/// The guard taken on acquire is parked inside the lock until then.
#[derive(Debug, Default)]
pub struct HistoryLock {
    mutex: Arc<AsyncMutex<()>>,
    held: Mutex<Option<OwnedMutexGuard<()>>>,
}

impl HistoryLock {
    pub fn new() -> Self {
        HistoryLock {
            mutex: Arc::new(AsyncMutex::new(())),
            held: Mutex::new(None),
        }
    }

    /// Waits until no other history fetch holds the lock, then takes it
    ///
    /// # Cancel Safety
    ///
    /// This method is cancel-safe. The lock is only taken once the future completes.
    pub async fn acquire(&self) {
        let guard = self.mutex.clone().lock_owned().await;
        self.park(guard);
    }

    /// Same as [HistoryLock::acquire] but blocks the current thread
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn blocking_acquire(&self) {
        let guard = self.mutex.clone().blocking_lock_owned();
        self.park(guard);
    }

    /// Takes the lock if it is free, returns false without waiting otherwise
    pub fn try_acquire(&self) -> bool {
        match self.mutex.clone().try_lock_owned() {
            Ok(guard) => {
                self.park(guard);
                true
            }
            Err(_) => false,
        }
    }

    /// Waits for the lock like [HistoryLock::acquire] and returns a guard that releases it on drop
    pub async fn acquire_scoped(&self) -> HistoryLockGuard<'_> {
        self.acquire().await;
        HistoryLockGuard { lock: self }
    }

    /// Releases the lock, does nothing if the lock is not held
    pub fn release(&self) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    pub fn is_held(&self) -> bool {
        self.mutex.try_lock().is_err()
    }

    fn park(&self, guard: OwnedMutexGuard<()>) {
        *self.held.lock().unwrap_or_else(PoisonError::into_inner) = Some(guard);
    }
}

/// [HistoryLockGuard] releases the [HistoryLock] it was acquired from when dropped
#[derive(Debug)]
pub struct HistoryLockGuard<'a> {
    lock: &'a HistoryLock,
}

impl Drop for HistoryLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_acquire_then_release() {
        let lock = HistoryLock::new();

        lock.acquire().await;
        assert!(lock.is_held());
        assert!(!lock.try_acquire());

        assert!(lock.release());
        assert!(!lock.is_held());
        assert!(lock.try_acquire());
    }

    #[test]
    fn test_release_when_not_held_is_noop() {
        let lock = HistoryLock::new();

        assert!(!lock.release());
        assert!(!lock.release());
        assert!(!lock.is_held());
    }

    #[tokio::test]
    async fn test_second_acquire_waits_for_release() {
        let lock = Arc::new(HistoryLock::new());
        lock.acquire().await;

        let waiter = {
            let lock = lock.clone();
            tokio::spawn(async move { lock.acquire().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        lock.release();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire after release")
            .unwrap();
        assert!(lock.is_held());
    }

    #[tokio::test]
    async fn test_scoped_guard_releases_on_drop() {
        let lock = HistoryLock::new();

        {
            let _guard = lock.acquire_scoped().await;
            assert!(lock.is_held());
        }

        assert!(!lock.is_held());
    }

    #[test]
    fn test_blocking_acquire_across_threads() {
        let lock = Arc::new(HistoryLock::new());
        lock.blocking_acquire();

        let handle = {
            let lock = lock.clone();
            std::thread::spawn(move || {
                lock.blocking_acquire();
                lock.release()
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());

        lock.release();
        assert!(handle.join().unwrap());
        assert!(!lock.is_held());
    }
}
