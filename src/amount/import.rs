use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::btc_to_sats;

/// Wallet-export JSON: `{ "transactions": [ { "amount": ..., "type": ... } ] }`.
/// Unknown fields are ignored and a missing `transactions` array is treated
/// as empty.
#[derive(Debug, Deserialize)]
struct WalletExport {
    #[serde(default)]
    transactions: Vec<TxRecord>,
}

#[derive(Debug, Deserialize)]
struct TxRecord {
    amount: TxAmount,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Exports in the wild carry amounts both as JSON numbers and as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TxAmount {
    Number(f64),
    Text(String),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid wallet export JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("transaction {index}: `{text}` is not a number")]
    BadAmount { index: usize, text: String },
    #[error("transaction {index}: amount exceeds the representable satoshi range")]
    OutOfRange { index: usize },
}

/// Reads a wallet export file and returns the net satoshi change per
/// transaction in file order: received amounts positive, sent amounts
/// negated, zero amounts dropped.
pub fn load_wallet_export(path: &Path) -> Result<Vec<i64>, ImportError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_wallet_export(&contents)
}

pub fn parse_wallet_export(json: &str) -> Result<Vec<i64>, ImportError> {
    let export: WalletExport = serde_json::from_str(json)?;

    let mut amounts = Vec::with_capacity(export.transactions.len());
    for (index, tx) in export.transactions.iter().enumerate() {
        let btc = match &tx.amount {
            TxAmount::Number(n) => *n,
            TxAmount::Text(s) => s.trim().parse().map_err(|_| ImportError::BadAmount {
                index,
                text: s.clone(),
            })?,
        };
        if !btc.is_finite() {
            return Err(ImportError::BadAmount {
                index,
                text: format!("{btc}"),
            });
        }
        let mut sats = btc_to_sats(btc).ok_or(ImportError::OutOfRange { index })?;
        if tx.kind == "sent" {
            sats = -sats;
        }
        if sats != 0 {
            amounts.push(sats);
        }
    }
    Ok(amounts)
}
