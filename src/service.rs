//! Core-facing wallet API.

use std::sync::Arc;

use crate::Amount;
use crate::engine::{Engine, WalletError, WalletLocks, WalletManager};
use crate::model::{Operation, OperationKind, Wallet, WalletId};
use crate::store::WalletStore;

/// Entry point for request-handling layers.
///
/// Owns one store handle and one lock registry, shared by the mutation
/// [`Engine`] and the [`WalletManager`]. Cloning is cheap and every clone
/// works on the same state.
pub struct WalletService<S> {
    engine: Engine<S>,
    manager: WalletManager<S>,
    locks: Arc<WalletLocks>,
}

impl<S: WalletStore> WalletService<S> {
    pub fn new(store: S) -> Self {
        Self::with_shared_store(Arc::new(store))
    }

    pub fn with_shared_store(store: Arc<S>) -> Self {
        let locks = Arc::new(WalletLocks::new());
        Self {
            engine: Engine::new(Arc::clone(&store), Arc::clone(&locks)),
            manager: WalletManager::new(store, Arc::clone(&locks)),
            locks,
        }
    }

    pub async fn list_wallets(&self) -> Result<Vec<Wallet>, WalletError> {
        self.manager.list().await
    }

    pub async fn get_wallet(&self, id: WalletId) -> Result<Wallet, WalletError> {
        self.manager.get(id).await
    }

    pub async fn create_wallet(&self) -> Result<Wallet, WalletError> {
        self.manager.create().await
    }

    pub async fn delete_wallet(&self, id: WalletId) -> Result<(), WalletError> {
        self.manager.delete(id).await
    }

    pub async fn apply_operation(
        &self,
        id: WalletId,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Wallet, WalletError> {
        self.engine.apply(id, kind, amount).await
    }

    pub async fn apply(&self, op: Operation) -> Result<Wallet, WalletError> {
        self.engine.apply_operation(op).await
    }

    /// The per-wallet lock registry used by this service.
    pub(crate) fn locks(&self) -> &WalletLocks {
        &self.locks
    }
}

impl<S> Clone for WalletService<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            manager: self.manager.clone(),
            locks: Arc::clone(&self.locks),
        }
    }
}
