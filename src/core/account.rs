use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an account (graph vertex) in the transaction network.
///
/// An account is whatever the input table calls a sender or receiver — a bank
/// account number, a wallet address, an opaque customer id. The engine never
/// interprets the string itself.
///
/// # Examples
///
/// ```
/// use fraud_ring_engine::core::account::AccountId;
///
/// let a = AccountId::new("ACC-001");
/// let b = AccountId::new("ACC-002");
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_equality() {
        let a = AccountId::new("ACC-001");
        let b = AccountId::new("ACC-001");
        let c = AccountId::new("ACC-002");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_account_display() {
        let a = AccountId::new("MULE-007");
        assert_eq!(format!("{}", a), "MULE-007");
    }

    #[test]
    fn test_account_ordering() {
        let a = AccountId::new("A");
        let b = AccountId::new("B");
        assert!(a < b);
    }
}
