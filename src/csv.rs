use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::batch::BatchCommand;
use crate::{Amount, Wallet, WalletId};

/// Errors that can occur when reading or writing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open csv file: {0}")]
    Open(#[source] csv::Error),

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command type '{command}'")]
    UnrecognizedType { line: usize, command: String },

    #[error("line {line}: {command} missing wallet")]
    MissingWallet { line: usize, command: String },

    #[error("line {line}: {command} missing amount")]
    MissingAmount { line: usize, command: String },

    #[error("line {line}: {command} invalid amount '{amount}', expected a positive decimal")]
    InvalidAmount {
        line: usize,
        command: String,
        amount: String,
    },

    #[error("failed to write csv output: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush csv output: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    wallet: Option<String>,
    amount: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    wallet: &'a str,
    id: WalletId,
    balance: String,
}

/// Read batch commands from a csv file
pub fn read_commands(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<BatchCommand, CsvError>>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(CsvError::Open)?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            parse_row(line, row)
        }))
}

fn parse_row(line: usize, row: InputRow) -> Result<BatchCommand, CsvError> {
    let command = row.r#type.as_str();
    if command == "list" {
        return Ok(BatchCommand::List);
    }
    if !matches!(command, "create" | "deposit" | "withdraw" | "delete" | "get") {
        return Err(CsvError::UnrecognizedType {
            line,
            command: command.to_string(),
        });
    }

    let wallet = row
        .wallet
        .filter(|w| !w.is_empty())
        .ok_or_else(|| CsvError::MissingWallet {
            line,
            command: command.to_string(),
        })?;

    match command {
        "create" => Ok(BatchCommand::Create { wallet }),
        "delete" => Ok(BatchCommand::Delete { wallet }),
        "get" => Ok(BatchCommand::Get { wallet }),
        "deposit" => Ok(BatchCommand::Deposit {
            wallet,
            amount: parse_amount(line, command, row.amount)?,
        }),
        _ => Ok(BatchCommand::Withdraw {
            wallet,
            amount: parse_amount(line, command, row.amount)?,
        }),
    }
}

/// Amounts must be strictly positive decimals
fn parse_amount(line: usize, command: &str, raw: Option<String>) -> Result<Amount, CsvError> {
    let raw = raw
        .filter(|a| !a.is_empty())
        .ok_or_else(|| CsvError::MissingAmount {
            line,
            command: command.to_string(),
        })?;

    match raw.parse::<Amount>() {
        Ok(amount) if amount.is_positive() => Ok(amount),
        _ => Err(CsvError::InvalidAmount {
            line,
            command: command.to_string(),
            amount: raw,
        }),
    }
}

/// Write labelled wallets in csv format
pub fn write_wallets<'a>(
    out: impl io::Write,
    wallets: impl IntoIterator<Item = (&'a str, Wallet)>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(out);

    for (label, wallet) in wallets {
        writer.serialize(OutputRow {
            wallet: label,
            id: wallet.id,
            balance: wallet.balance.to_string(),
        })?;
    }

    writer.flush()?;
    Ok(())
}
