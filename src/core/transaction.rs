use crate::core::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single transaction record from the input batch.
///
/// Transactions are immutable once created. The graph builder consumes a
/// `Vec<Transaction>` and aggregates repeated `(sender, receiver)` pairs into
/// single edges; the detectors that need per-record granularity (the ghost
/// account and merchant predicates) consult this original table directly.
///
/// # Examples
///
/// ```
/// use fraud_ring_engine::core::transaction::Transaction;
/// use fraud_ring_engine::core::account::AccountId;
/// use chrono::Utc;
/// use rust_decimal_macros::dec;
///
/// let txn = Transaction::new(
///     "TXN-1",
///     AccountId::new("A"),
///     AccountId::new("B"),
///     dec!(1000),
///     Utc::now(),
/// );
/// assert_eq!(txn.amount(), dec!(1000));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    transaction_id: String,
    sender_id: AccountId,
    receiver_id: AccountId,
    amount: Decimal,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        transaction_id: impl Into<String>,
        sender_id: AccountId,
        receiver_id: AccountId,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            sender_id,
            receiver_id,
            amount,
            timestamp,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn sender_id(&self) -> &AccountId {
        &self.sender_id
    }

    pub fn receiver_id(&self) -> &AccountId {
        &self.receiver_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// True if sender and receiver are the same account (dropped by the
    /// graph builder; never a valid edge).
    pub fn is_self_loop(&self) -> bool {
        self.sender_id == self.receiver_id
    }
}
