//! Batch driver: applies a stream of labelled wallet commands.
//!
//! Wallet ids are generated by the core, so batch input refers to wallets by
//! a caller-chosen label that is bound on `create` and released on `delete`.

use std::collections::HashMap;

use thiserror::Error;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Amount;
use crate::engine::WalletError;
use crate::model::{Operation, Wallet, WalletId};
use crate::service::WalletService;
use crate::store::WalletStore;

/// One input command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchCommand {
    Create { wallet: String },
    Deposit { wallet: String, amount: Amount },
    Withdraw { wallet: String, amount: Amount },
    Delete { wallet: String },
    Get { wallet: String },
    List,
}

impl BatchCommand {
    /// Label the command targets; `None` for `list`.
    pub fn wallet(&self) -> Option<&str> {
        match self {
            BatchCommand::Create { wallet }
            | BatchCommand::Deposit { wallet, .. }
            | BatchCommand::Withdraw { wallet, .. }
            | BatchCommand::Delete { wallet }
            | BatchCommand::Get { wallet } => Some(wallet),
            BatchCommand::List => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BatchCommand::Create { .. } => "create",
            BatchCommand::Deposit { .. } => "deposit",
            BatchCommand::Withdraw { .. } => "withdraw",
            BatchCommand::Delete { .. } => "delete",
            BatchCommand::Get { .. } => "get",
            BatchCommand::List => "list",
        }
    }
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("unknown wallet '{0}'")]
    UnknownWallet(String),

    #[error("wallet '{0}' already exists")]
    DuplicateWallet(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Applies [`BatchCommand`]s against a [`WalletService`].
pub struct BatchRunner<S> {
    service: WalletService<S>,
    labels: HashMap<String, WalletId>,
}

impl<S: WalletStore> BatchRunner<S> {
    pub fn new(service: WalletService<S>) -> Self {
        Self {
            service,
            labels: HashMap::new(),
        }
    }

    /// Run every command from the stream; failures are logged and skipped.
    pub async fn run(&mut self, mut stream: impl Stream<Item = BatchCommand> + Unpin) {
        while let Some(command) = stream.next().await {
            let name = command.name();
            let label = command.wallet().unwrap_or_default().to_string();
            if let Err(e) = self.execute(command).await {
                warn!(command = name, wallet = %label, "{e}");
            }
        }
    }

    /// Execute a single command.
    ///
    /// Returns the wallets the command produced or read: the created or
    /// updated wallet, the wallet looked up by `get`, every wallet for `list`,
    /// nothing for `delete`.
    pub async fn execute(&mut self, command: BatchCommand) -> Result<Vec<Wallet>, BatchError> {
        let wallets = match command {
            BatchCommand::Create { wallet } => {
                if self.labels.contains_key(&wallet) {
                    return Err(BatchError::DuplicateWallet(wallet));
                }
                let created = self.service.create_wallet().await?;
                self.labels.insert(wallet, created.id);
                vec![created]
            }
            BatchCommand::Deposit { wallet, amount } => {
                let id = self.resolve(&wallet)?;
                vec![self.service.apply(Operation::deposit(id, amount)).await?]
            }
            BatchCommand::Withdraw { wallet, amount } => {
                let id = self.resolve(&wallet)?;
                vec![self.service.apply(Operation::withdraw(id, amount)).await?]
            }
            BatchCommand::Delete { wallet } => {
                let id = self.resolve(&wallet)?;
                self.service.delete_wallet(id).await?;
                self.labels.remove(&wallet);
                Vec::new()
            }
            BatchCommand::Get { wallet } => {
                let id = self.resolve(&wallet)?;
                let found = self.service.get_wallet(id).await?;
                Self::log_snapshot("get", &found);
                vec![found]
            }
            BatchCommand::List => {
                let all = self.service.list_wallets().await?;
                info!(count = all.len(), "list");
                for found in &all {
                    Self::log_snapshot("list", found);
                }
                all
            }
        };
        Ok(wallets)
    }

    /// Current state of every bound wallet, sorted by label.
    pub async fn wallets(&self) -> Result<Vec<(String, Wallet)>, WalletError> {
        let mut labels: Vec<_> = self.labels.iter().collect();
        labels.sort();

        let mut wallets = Vec::with_capacity(labels.len());
        for (label, id) in labels {
            wallets.push((label.clone(), self.service.get_wallet(*id).await?));
        }
        Ok(wallets)
    }

    pub fn service(&self) -> &WalletService<S> {
        &self.service
    }

    /// Small helper to log read results
    fn log_snapshot(command: &str, wallet: &Wallet) {
        info!(
            wallet = %wallet.id,
            balance = %wallet.balance,
            "{command} snapshot"
        );
    }

    fn resolve(&self, label: &str) -> Result<WalletId, BatchError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| BatchError::UnknownWallet(label.to_string()))
    }
}
