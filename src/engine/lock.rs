//! Per-wallet mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

use crate::model::WalletId;

type Slot = Arc<AsyncMutex<()>>;

/// Registry of one async mutex per wallet id.
///
/// Slots are created on first use and evicted once nobody holds or waits on
/// them, so the map only ever contains wallets with in-flight operations.
/// Operations on different wallets never contend on anything but the brief
/// registry lookup.
#[derive(Debug, Default)]
pub struct WalletLocks {
    slots: Mutex<HashMap<WalletId, Slot>>,
}

impl WalletLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other task holds the lock for `wallet`, then take it.
    ///
    /// Waiters are served in arrival order. Dropping the returned future
    /// before it completes leaves the lock untouched.
    pub async fn acquire(&self, wallet: WalletId) -> WalletGuard<'_> {
        let lease = self.lease(wallet);
        let held = Arc::clone(&lease.slot).lock_owned().await;
        trace!(wallet = %wallet, "wallet lock acquired");
        WalletGuard {
            _held: held,
            lease,
        }
    }

    /// Number of wallets that currently have a lock slot.
    pub fn tracked(&self) -> usize {
        self.slots().len()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<WalletId, Slot>> {
        // the map is left consistent by every critical section, poisoning carries no meaning here
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lease(&self, wallet: WalletId) -> Lease<'_> {
        let slot = Arc::clone(self.slots().entry(wallet).or_default());
        Lease {
            registry: self,
            wallet,
            slot,
        }
    }
}

/// Reference to a registry slot; evicts the slot when it is the last one.
struct Lease<'a> {
    registry: &'a WalletLocks,
    wallet: WalletId,
    slot: Slot,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let mut slots = self.registry.slots();
        // Clones are only handed out under the registry mutex, so a count of
        // two (map + this lease) means no holder or waiter is left.
        if Arc::strong_count(&self.slot) == 2 {
            slots.remove(&self.wallet);
            trace!(wallet = %self.wallet, "wallet lock slot evicted");
        }
    }
}

/// Exclusive hold on one wallet. Released on drop.
pub struct WalletGuard<'a> {
    // field order: the mutex is released before the lease checks for eviction
    _held: OwnedMutexGuard<()>,
    lease: Lease<'a>,
}

impl WalletGuard<'_> {
    pub fn wallet(&self) -> WalletId {
        self.lease.wallet
    }
}

impl std::fmt::Debug for WalletGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletGuard")
            .field("wallet", &self.lease.wallet)
            .finish()
    }
}
