use std::env;
use std::process::ExitCode;

use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use wallet_eng::batch::BatchRunner;
use wallet_eng::csv::{read_commands, write_wallets};
use wallet_eng::{InMemoryWalletStore, WalletService};

const CHANNEL_CAPACITY: usize = 16;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .expect("usage: wallet-eng <commands.csv>");

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let commands = match read_commands(path.clone()) {
        Ok(commands) => commands,
        Err(e) => {
            error!(path, "{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut runner = BatchRunner::new(WalletService::new(InMemoryWalletStore::new()));
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if cmd_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    runner.run(ReceiverStream::new(cmd_receiver)).await;

    let wallets = match runner.wallets().await {
        Ok(wallets) => wallets,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let rows = wallets.iter().map(|(label, wallet)| (label.as_str(), *wallet));
    if let Err(e) = write_wallets(std::io::stdout().lock(), rows) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
