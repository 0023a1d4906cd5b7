use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, WalletStore};
use crate::model::{Wallet, WalletId};

/// Process-local wallet store.
///
/// Each call takes the map lock once, so a single `save` is never observed
/// half-written.
#[derive(Debug, Default)]
pub struct InMemoryWalletStore {
    wallets: RwLock<HashMap<WalletId, Wallet>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn find_by_id(&self, id: WalletId) -> Result<Option<Wallet>, StoreError> {
        Ok(self.wallets.read().await.get(&id).copied())
    }

    async fn find_all(&self) -> Result<Vec<Wallet>, StoreError> {
        Ok(self.wallets.read().await.values().copied().collect())
    }

    async fn save(&self, wallet: Wallet) -> Result<(), StoreError> {
        self.wallets.write().await.insert(wallet.id, wallet);
        Ok(())
    }

    async fn delete(&self, id: WalletId) -> Result<(), StoreError> {
        self.wallets.write().await.remove(&id);
        Ok(())
    }
}
