use crate::core::account::AccountId;
use crate::core::error::EngineError;
use crate::core::transaction::Transaction;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Expected header, in order. Extra columns are ignored; these five must be
/// present under these exact names.
const REQUIRED_COLUMNS: [&str; 5] = ["transaction_id", "sender_id", "receiver_id", "amount", "timestamp"];

/// A single input row, deserialized with `amount` and `timestamp` still as
/// strings so parse failures can be attributed to a specific row/column as
/// `InvalidInput` instead of failing the whole deserialize opaquely.
#[derive(Debug, Deserialize)]
struct RawTransactionRow {
    transaction_id: String,
    sender_id: String,
    receiver_id: String,
    amount: String,
    timestamp: String,
}

/// Load a batch of transactions from a CSV file.
///
/// Row numbers in error messages are 1-based and count the header line, so
/// the first data row is row 2 — matching what a user sees when they open
/// the file in a spreadsheet or editor.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| EngineError::IOFailure {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, source),
        })?;

    let headers = reader
        .headers()
        .map_err(|source| EngineError::IOFailure {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, source),
        })?
        .clone();
    for name in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == name) {
            return Err(EngineError::InvalidInput {
                row: 1,
                column: name.to_string(),
                detail: "missing required column".to_string(),
            });
        }
    }

    let mut transactions = Vec::new();
    for (offset, record) in reader.records().enumerate() {
        let row = offset + 2;
        let record = record.map_err(|source| EngineError::IOFailure {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, source),
        })?;

        let raw: RawTransactionRow = record.deserialize(Some(&headers)).map_err(|source| {
            EngineError::InvalidInput {
                row,
                column: "<row>".to_string(),
                detail: source.to_string(),
            }
        })?;

        let transaction_id = non_empty(&raw.transaction_id, row, "transaction_id")?;
        let sender = non_empty(&raw.sender_id, row, "sender_id")?;
        let receiver = non_empty(&raw.receiver_id, row, "receiver_id")?;
        let amount_raw = non_empty(&raw.amount, row, "amount")?;
        let timestamp_raw = non_empty(&raw.timestamp, row, "timestamp")?;

        let amount = Decimal::from_str(amount_raw).map_err(|_| EngineError::InvalidInput {
            row,
            column: "amount".to_string(),
            detail: format!("'{amount_raw}' is not a valid decimal amount"),
        })?;
        if amount.is_sign_negative() {
            return Err(EngineError::InvalidInput {
                row,
                column: "amount".to_string(),
                detail: format!("'{amount_raw}' is negative; amounts must be non-negative"),
            });
        }
        let timestamp = parse_timestamp(timestamp_raw).ok_or_else(|| EngineError::InvalidInput {
            row,
            column: "timestamp".to_string(),
            detail: format!("'{timestamp_raw}' is not a recognized timestamp"),
        })?;

        transactions.push(Transaction::new(
            transaction_id,
            AccountId::new(sender),
            AccountId::new(receiver),
            amount,
            timestamp,
        ));
    }

    log::info!("loaded {} transactions from '{}'", transactions.len(), path.display());
    Ok(transactions)
}

fn non_empty<'a>(value: &'a str, row: usize, column: &str) -> Result<&'a str, EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidInput {
            row,
            column: column.to_string(),
            detail: "value is empty".to_string(),
        });
    }
    Ok(value)
}

/// Accepts RFC3339 (`2024-01-01T00:00:00Z`) and a plain
/// `YYYY-MM-DD HH:MM:SS` form, treated as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_well_formed_rows() {
        let file = write_temp_csv(
            "transaction_id,sender_id,receiver_id,amount,timestamp\n\
             T1,A,B,100.50,2024-01-01T00:00:00Z\n\
             T2,B,C,50,2024-01-01 01:00:00\n",
        );
        let txns = load_transactions(file.path()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].transaction_id(), "T1");
        assert_eq!(txns[1].amount(), Decimal::from_str("50").unwrap());
    }

    #[test]
    fn test_missing_column_rejected() {
        let file = write_temp_csv("transaction_id,sender_id,amount,timestamp\nT1,A,100,2024-01-01T00:00:00Z\n");
        let err = load_transactions(file.path()).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_bad_amount_rejected() {
        let file = write_temp_csv(
            "transaction_id,sender_id,receiver_id,amount,timestamp\nT1,A,B,not-a-number,2024-01-01T00:00:00Z\n",
        );
        let err = load_transactions(file.path()).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let file = write_temp_csv(
            "transaction_id,sender_id,receiver_id,amount,timestamp\nT1,A,B,-500,2024-01-01T00:00:00Z\n",
        );
        let err = load_transactions(file.path()).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let file = write_temp_csv(
            "transaction_id,sender_id,receiver_id,amount,timestamp\nT1,A,B,100,not-a-date\n",
        );
        let err = load_transactions(file.path()).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }
}
