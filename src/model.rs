//! Core domain types for the wallet engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Amount;

/// Opaque wallet identifier, generated once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(Uuid);

impl WalletId {
    /// Allocate a fresh random identifier.
    pub fn new() -> Self {
        WalletId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WalletId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for WalletId {
    fn from(value: Uuid) -> Self {
        WalletId(value)
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A balance-bearing account.
///
/// Values are snapshots: the engine reads one, computes the next balance and
/// saves a new value, it never mutates a shared instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub balance: Amount,
}

impl Wallet {
    /// A new wallet with zero balance.
    pub fn empty(id: WalletId) -> Self {
        Self {
            id,
            balance: Amount::ZERO,
        }
    }
}

/// Direction of a balance mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Deposit,
    Withdraw,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Deposit => "deposit",
            OperationKind::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deposit or withdrawal against one wallet. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub wallet: WalletId,
    pub kind: OperationKind,
    /// Strictly positive.
    pub amount: Amount,
}

impl Operation {
    pub fn deposit(wallet: WalletId, amount: Amount) -> Self {
        Self {
            wallet,
            kind: OperationKind::Deposit,
            amount,
        }
    }

    pub fn withdraw(wallet: WalletId, amount: Amount) -> Self {
        Self {
            wallet,
            kind: OperationKind::Withdraw,
            amount,
        }
    }
}
