//! Error types for wallet operations.

use thiserror::Error;

use crate::Amount;
use crate::model::WalletId;
use crate::store::StoreError;

/// Error returned by every core operation.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet with id {0} not found")]
    NotFound(WalletId),

    #[error(
        "wallet with id {wallet} not enough balance: balance {balance}, requested {requested}"
    )]
    InsufficientBalance {
        wallet: WalletId,
        balance: Amount,
        requested: Amount,
    },

    #[error("wallet with id {wallet} balance overflow: balance {balance}, deposit {requested}")]
    BalanceOverflow {
        wallet: WalletId,
        balance: Amount,
        requested: Amount,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WalletError {
    /// Wallet the failure refers to, if it is a business-rule failure.
    pub fn wallet(&self) -> Option<WalletId> {
        match self {
            WalletError::NotFound(wallet)
            | WalletError::InsufficientBalance { wallet, .. }
            | WalletError::BalanceOverflow { wallet, .. } => Some(*wallet),
            WalletError::Store(_) => None,
        }
    }
}
