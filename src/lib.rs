pub mod amount;
pub mod batch;
pub mod csv;
pub mod engine;
pub mod model;
pub mod service;
pub mod store;

pub use amount::Amount;
pub use engine::{Engine, WalletError, WalletLocks, WalletManager};
pub use model::{Operation, OperationKind, Wallet, WalletId};
pub use service::WalletService;
pub use store::{InMemoryWalletStore, StoreError, WalletStore};
