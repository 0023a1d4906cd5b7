//! Balance mutation engine.
//!
//! Applies deposits and withdrawals one wallet at a time: every mutation
//! takes the wallet's lock, re-reads the stored balance, checks it and writes
//! the new snapshot before the lock is released. Reads done outside the lock
//! are never used to decide a write.

use std::sync::Arc;

use tracing::info;

use crate::Amount;
use crate::model::{Operation, OperationKind, Wallet, WalletId};
use crate::store::WalletStore;

mod error;
pub use error::WalletError;

mod lock;
pub use lock::{WalletGuard, WalletLocks};

mod lifecycle;
pub use lifecycle::WalletManager;

/// Applies [`Operation`]s to stored wallets.
pub struct Engine<S> {
    store: Arc<S>,
    locks: Arc<WalletLocks>,
}

/// Public API
impl<S: WalletStore> Engine<S> {
    pub fn new(store: Arc<S>, locks: Arc<WalletLocks>) -> Self {
        Self { store, locks }
    }

    /// Apply one deposit or withdrawal and return the updated wallet.
    ///
    /// Waits for any in-flight operation on the same wallet. On failure
    /// nothing is written.
    ///
    /// # Panics
    ///
    /// If `amount` is not strictly positive; callers validate amounts first.
    pub async fn apply(
        &self,
        wallet: WalletId,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Wallet, WalletError> {
        assert!(
            amount.is_positive(),
            "{kind} amount must be positive, got {amount}"
        );

        let result = self.apply_locked(wallet, kind, amount).await;
        Self::log_result(kind, wallet, amount, &result);
        result
    }

    /// Same as [`Engine::apply`] for a prebuilt [`Operation`].
    pub async fn apply_operation(&self, op: Operation) -> Result<Wallet, WalletError> {
        self.apply(op.wallet, op.kind, op.amount).await
    }
}

/// Private API
impl<S: WalletStore> Engine<S> {
    async fn apply_locked(
        &self,
        wallet: WalletId,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Wallet, WalletError> {
        let _guard = self.locks.acquire(wallet).await;

        let current = self
            .store
            .find_by_id(wallet)
            .await?
            .ok_or(WalletError::NotFound(wallet))?;

        let balance = match kind {
            OperationKind::Deposit => Self::credit(&current, amount)?,
            OperationKind::Withdraw => Self::debit(&current, amount)?,
        };

        let updated = Wallet {
            id: wallet,
            balance,
        };
        // commit point
        self.store.save(updated).await?;

        Ok(updated)
    }

    fn credit(current: &Wallet, amount: Amount) -> Result<Amount, WalletError> {
        current
            .balance
            .checked_add(amount)
            .ok_or(WalletError::BalanceOverflow {
                wallet: current.id,
                balance: current.balance,
                requested: amount,
            })
    }

    fn debit(current: &Wallet, amount: Amount) -> Result<Amount, WalletError> {
        if current.balance < amount {
            return Err(WalletError::InsufficientBalance {
                wallet: current.id,
                balance: current.balance,
                requested: amount,
            });
        }
        Ok(current.balance - amount)
    }

    /// Small helper to log `apply` results
    fn log_result(
        kind: OperationKind,
        wallet: WalletId,
        amount: Amount,
        result: &Result<Wallet, WalletError>,
    ) {
        match result {
            Ok(updated) => {
                info!(
                    wallet = %wallet,
                    amount = %amount,
                    balance = %updated.balance,
                    "{kind} applied"
                );
            }
            Err(e) => {
                info!(
                    wallet = %wallet,
                    amount = %amount,
                    reason = %e,
                    "{kind} skipped"
                );
            }
        }
    }
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryWalletStore;

    // test utils

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    async fn engine_with_wallet(balance: &str) -> (Engine<InMemoryWalletStore>, WalletId) {
        let store = Arc::new(InMemoryWalletStore::new());
        let id = WalletId::new();
        store
            .save(Wallet {
                id,
                balance: amount(balance),
            })
            .await
            .unwrap();
        (Engine::new(store, Arc::new(WalletLocks::new())), id)
    }

    async fn stored_balance(engine: &Engine<InMemoryWalletStore>, id: WalletId) -> Amount {
        engine.store.find_by_id(id).await.unwrap().unwrap().balance
    }

    // Deposit

    #[tokio::test]
    async fn deposit_increases_balance() {
        let (engine, id) = engine_with_wallet("0").await;

        let wallet = engine
            .apply(id, OperationKind::Deposit, amount("100"))
            .await
            .unwrap();

        assert_eq!(wallet.id, id);
        assert_eq!(wallet.balance, amount("100"));
        assert_eq!(stored_balance(&engine, id).await, amount("100"));
    }

    #[tokio::test]
    async fn deposit_keeps_fractional_precision() {
        let (engine, id) = engine_with_wallet("0.1").await;

        let wallet = engine
            .apply(id, OperationKind::Deposit, amount("0.2"))
            .await
            .unwrap();
        assert_eq!(wallet.balance, amount("0.3"));
    }

    #[tokio::test]
    async fn deposit_overflow_fails_without_write() {
        let (engine, id) = engine_with_wallet("79228162514264337593543950335").await;

        let result = engine.apply(id, OperationKind::Deposit, amount("1")).await;
        assert!(matches!(
            result,
            Err(WalletError::BalanceOverflow { wallet, .. }) if wallet == id
        ));
        assert_eq!(
            stored_balance(&engine, id).await,
            amount("79228162514264337593543950335")
        );
    }

    // Withdraw

    #[tokio::test]
    async fn withdraw_decreases_balance() {
        let (engine, id) = engine_with_wallet("100").await;

        let wallet = engine
            .apply(id, OperationKind::Withdraw, amount("40"))
            .await
            .unwrap();
        assert_eq!(wallet.balance, amount("60"));
    }

    #[tokio::test]
    async fn withdraw_exact_balance_leaves_zero() {
        let (engine, id) = engine_with_wallet("60").await;

        let wallet = engine
            .apply(id, OperationKind::Withdraw, amount("60"))
            .await
            .unwrap();
        assert_eq!(wallet.balance, Amount::ZERO);
    }

    #[tokio::test]
    async fn withdraw_above_balance_fails() {
        let (engine, id) = engine_with_wallet("60").await;

        let result = engine
            .apply(id, OperationKind::Withdraw, amount("60.0001"))
            .await;

        match result {
            Err(WalletError::InsufficientBalance {
                wallet,
                balance,
                requested,
            }) => {
                assert_eq!(wallet, id);
                assert_eq!(balance, amount("60"));
                assert_eq!(requested, amount("60.0001"));
            }
            other => panic!("expected insufficient balance, got {other:?}"),
        }

        // Balance unchanged
        assert_eq!(stored_balance(&engine, id).await, amount("60"));
    }

    #[tokio::test]
    async fn deposit_then_withdraw_restores_balance() {
        let (engine, id) = engine_with_wallet("12.34").await;

        engine
            .apply_operation(Operation::deposit(id, amount("7.777")))
            .await
            .unwrap();
        let wallet = engine
            .apply_operation(Operation::withdraw(id, amount("7.777")))
            .await
            .unwrap();
        assert_eq!(wallet.balance, amount("12.34"));
    }

    // Missing wallet

    #[tokio::test]
    async fn unknown_wallet_fails_not_found() {
        let (engine, _) = engine_with_wallet("0").await;
        let missing = WalletId::new();

        for kind in [OperationKind::Deposit, OperationKind::Withdraw] {
            let result = engine.apply(missing, kind, amount("1")).await;
            assert!(matches!(result, Err(WalletError::NotFound(id)) if id == missing));
        }

        // a failed deposit must not create the wallet
        assert_eq!(engine.store.find_by_id(missing).await.unwrap(), None);
    }

    #[tokio::test]
    async fn lock_is_released_on_error_paths() {
        let (engine, id) = engine_with_wallet("1").await;

        let _ = engine.apply(id, OperationKind::Withdraw, amount("5")).await;
        let _ = engine
            .apply(WalletId::new(), OperationKind::Deposit, amount("5"))
            .await;
        assert_eq!(engine.locks.tracked(), 0);

        // wallet still usable afterwards
        engine
            .apply(id, OperationKind::Deposit, amount("1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    #[should_panic(expected = "amount must be positive")]
    async fn non_positive_amount_is_a_programming_error() {
        let (engine, id) = engine_with_wallet("10").await;
        let _ = engine.apply(id, OperationKind::Deposit, Amount::ZERO).await;
    }
}
