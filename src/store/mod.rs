//! Persistence boundary for wallets.
//!
//! The core only needs find/save/delete by id; any backend that honours the
//! [`WalletStore`] contract can be plugged into
//! [`WalletService`](crate::WalletService).

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Wallet, WalletId};

mod memory;
pub use memory::InMemoryWalletStore;

/// Infrastructure failure reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        StoreError::Backend(err.into())
    }
}

/// Durable wallet storage keyed by [`WalletId`].
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Look up one wallet.
    async fn find_by_id(&self, id: WalletId) -> Result<Option<Wallet>, StoreError>;

    /// All stored wallets, in backend-defined order.
    async fn find_all(&self) -> Result<Vec<Wallet>, StoreError>;

    /// Insert or replace the wallet with the same id. Must be atomic per wallet.
    async fn save(&self, wallet: Wallet) -> Result<(), StoreError>;

    /// Remove the wallet with the given id.
    async fn delete(&self, id: WalletId) -> Result<(), StoreError>;
}
