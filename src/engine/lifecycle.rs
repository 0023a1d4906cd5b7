//! Wallet creation, lookup and deletion.

use std::sync::Arc;

use tracing::info;

use super::{WalletError, WalletLocks};
use crate::model::{Wallet, WalletId};
use crate::store::WalletStore;

/// Creates and destroys wallets, and answers read queries.
///
/// Reads go straight to the store without locking; treat them as snapshots.
/// Deletion takes the same per-wallet lock as the [`Engine`](super::Engine)
/// so it is strictly ordered with mutations.
pub struct WalletManager<S> {
    store: Arc<S>,
    locks: Arc<WalletLocks>,
}

impl<S: WalletStore> WalletManager<S> {
    pub fn new(store: Arc<S>, locks: Arc<WalletLocks>) -> Self {
        Self { store, locks }
    }

    /// Persist a new wallet with a fresh id and zero balance.
    pub async fn create(&self) -> Result<Wallet, WalletError> {
        let wallet = Wallet::empty(WalletId::new());
        self.store.save(wallet).await?;
        info!(wallet = %wallet.id, "wallet created");
        Ok(wallet)
    }

    pub async fn get(&self, id: WalletId) -> Result<Wallet, WalletError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(WalletError::NotFound(id))
    }

    /// All wallets, in store order. Empty when there are none.
    pub async fn list(&self) -> Result<Vec<Wallet>, WalletError> {
        Ok(self.store.find_all().await?)
    }

    /// Permanently remove a wallet.
    pub async fn delete(&self, id: WalletId) -> Result<(), WalletError> {
        let _guard = self.locks.acquire(id).await;

        if self.store.find_by_id(id).await?.is_none() {
            info!(wallet = %id, "wallet delete skipped: not found");
            return Err(WalletError::NotFound(id));
        }
        self.store.delete(id).await?;

        info!(wallet = %id, "wallet deleted");
        Ok(())
    }
}

impl<S> Clone for WalletManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}
