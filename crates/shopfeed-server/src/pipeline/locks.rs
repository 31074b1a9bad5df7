use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per shop, created on first use and forgotten once no
/// task holds or waits for it.
///
/// Holding a shop's guard serializes generations and removals for that shop
/// inside this process; different shops never wait on each other.
#[derive(Debug, Default)]
pub struct ShopLocks {
    slots: StdMutex<HashMap<String, Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    lock: Arc<Mutex<()>>,
    /// Holders plus waiters.
    users: usize,
}

/// Exclusive access to one shop until dropped.
#[derive(Debug)]
pub struct ShopGuard<'a> {
    // Field order matters: the mutex is released before the slot is
    // unregistered.
    _guard: OwnedMutexGuard<()>,
    _registration: Registration<'a>,
}

/// Counts one user of a slot; dropping it (including when a waiting
/// `acquire` is cancelled) gives the count back.
#[derive(Debug)]
struct Registration<'a> {
    locks: &'a ShopLocks,
    shop: String,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let mut slots = self.locks.slots();
        if let Some(slot) = slots.get_mut(&self.shop) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                slots.remove(&self.shop);
            }
        }
    }
}

impl ShopLocks {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for and returns the guard for `shop`.
    pub async fn acquire(&self, shop: &str) -> ShopGuard<'_> {
        let (lock, registration) = {
            let mut slots = self.slots();
            let slot = slots.entry(shop.to_owned()).or_default();
            slot.users += 1;
            (
                Arc::clone(&slot.lock),
                Registration {
                    locks: self,
                    shop: shop.to_owned(),
                },
            )
        };
        let guard = lock.lock_owned().await;
        ShopGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Number of shops currently held or awaited.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.slots().len()
    }
}
