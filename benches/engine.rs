use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tokio::runtime::Runtime;
use wallet_eng::{Amount, InMemoryWalletStore, Operation, WalletId, WalletService};

/// Generates valid operation sequences for benchmarking.
///
/// Pattern per wallet (repeating):
/// 1. Deposit 100
/// 2. Deposit 50
/// 3. Withdraw 30
///
/// This ensures withdrawals never exceed the balance.
pub struct OpGenerator {
    wallets: Vec<WalletId>,
    ops_per_wallet: u32,
    current_wallet: usize,
    current_step: u32,
}

impl OpGenerator {
    pub fn new(wallets: Vec<WalletId>, ops_per_wallet: u32) -> Self {
        Self {
            wallets,
            ops_per_wallet,
            current_wallet: 0,
            current_step: 0,
        }
    }
}

impl Iterator for OpGenerator {
    type Item = Operation;

    fn next(&mut self) -> Option<Self::Item> {
        let wallet = *self.wallets.get(self.current_wallet)?;

        // Pattern: deposit 100, deposit 50, withdraw 30 (repeating)
        let op = match self.current_step % 3 {
            0 => Operation::deposit(wallet, amount("100")),
            1 => Operation::deposit(wallet, amount("50")),
            _ => Operation::withdraw(wallet, amount("30")),
        };

        self.current_step += 1;

        // Move to next wallet after ops_per_wallet operations
        if self.current_step >= self.ops_per_wallet {
            self.current_step = 0;
            self.current_wallet += 1;
        }

        Some(op)
    }
}

fn amount(s: &str) -> Amount {
    s.parse().unwrap()
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .build()
        .unwrap()
}

async fn service_with_wallets(count: usize) -> (WalletService<InMemoryWalletStore>, Vec<WalletId>) {
    let service = WalletService::new(InMemoryWalletStore::new());
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(service.create_wallet().await.unwrap().id);
    }
    (service, ids)
}

fn bench_sequential(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("sequential");

    for count in [1_000u32, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                rt.block_on(async {
                    let (service, ids) = service_with_wallets(1).await;
                    for op in OpGenerator::new(ids, count) {
                        let _ = black_box(service.apply(op).await);
                    }
                    service
                })
            });
        });
    }

    group.finish();
}

/// Every task targets the same wallet, so all of them serialize on one lock
fn bench_single_wallet_contention(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("contention");

    for tasks in [8usize, 64, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(tasks), &tasks, |b, &tasks| {
            b.iter(|| {
                rt.block_on(async {
                    let (service, ids) = service_with_wallets(1).await;
                    let wallet = ids[0];
                    let handles: Vec<_> = (0..tasks)
                        .map(|_| {
                            let service = service.clone();
                            tokio::spawn(async move {
                                for _ in 0..100 {
                                    let _ = service
                                        .apply(Operation::deposit(wallet, amount("1")))
                                        .await;
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.await.unwrap();
                    }
                    service
                })
            });
        });
    }

    group.finish();
}

/// One task per wallet, no shared lock between tasks
fn bench_parallel_wallets(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("parallel");

    for (wallets, ops_per) in [(10usize, 1_000u32), (100, 100), (1_000, 10)] {
        let label = format!("{}w_{}op", wallets, ops_per);
        group.bench_with_input(
            BenchmarkId::from_parameter(&label),
            &(wallets, ops_per),
            |b, &(wallets, ops_per)| {
                b.iter(|| {
                    rt.block_on(async {
                        let (service, ids) = service_with_wallets(wallets).await;
                        let handles: Vec<_> = ids
                            .into_iter()
                            .map(|id| {
                                let service = service.clone();
                                tokio::spawn(async move {
                                    for op in OpGenerator::new(vec![id], ops_per) {
                                        let _ = black_box(service.apply(op).await);
                                    }
                                })
                            })
                            .collect();
                        for handle in handles {
                            handle.await.unwrap();
                        }
                        service
                    })
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sequential,
    bench_single_wallet_contention,
    bench_parallel_wallets,
);

criterion_main!(benches);
