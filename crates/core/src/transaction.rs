//! Transaction types.
//!
//! A transaction is immutable once built: its digest is derived from the
//! payload at construction and no setter exists.

use crate::hash::{hash, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transaction stored in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transaction {
    /// A bare value carried verbatim.
    Minimal(MinimalTransaction),
}

impl Transaction {
    /// Create a minimal transaction carrying `value`.
    pub fn minimal(value: impl Into<String>) -> Self {
        Self::Minimal(MinimalTransaction::new(value))
    }

    /// The digest of this transaction.
    pub fn digest(&self) -> &Digest {
        match self {
            Self::Minimal(tx) => tx.digest(),
        }
    }

    /// The opaque payload, as text.
    pub fn payload(&self) -> &str {
        match self {
            Self::Minimal(tx) => tx.value(),
        }
    }

    /// Check that the stored digest still matches the payload.
    ///
    /// Always true for transactions built in-process; a deserialized
    /// transaction may fail it.
    pub fn verify_digest(&self) -> bool {
        match self {
            Self::Minimal(tx) => tx.verify_digest(),
        }
    }
}

impl From<MinimalTransaction> for Transaction {
    fn from(tx: MinimalTransaction) -> Self {
        Self::Minimal(tx)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.payload(), self.digest().short())
    }
}

/// The minimal value transaction: a text value and its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalTransaction {
    digest: Digest,
    value: String,
}

impl MinimalTransaction {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            digest: hash(value.as_bytes()),
            value,
        }
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn verify_digest(&self) -> bool {
        self.digest == hash(self.value.as_bytes())
    }
}

impl Default for MinimalTransaction {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_matches_payload() {
        let tx = Transaction::minimal("pay 10 to bob");
        assert_eq!(tx.payload(), "pay 10 to bob");
        assert_eq!(tx.digest(), &hash(b"pay 10 to bob"));
        assert!(tx.verify_digest());
    }

    #[test]
    fn test_default_is_empty_value() {
        let tx = MinimalTransaction::default();
        assert_eq!(tx.value(), "");
        assert_eq!(tx.digest(), &hash(b""));
    }

    #[test]
    fn test_equal_payloads_share_digest() {
        let a = Transaction::minimal("same");
        let b = Transaction::minimal("same");
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), Transaction::minimal("other").digest());
    }

    #[test]
    fn test_serialized_form() {
        let tx = Transaction::minimal("GENESIS");
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["kind"], "minimal");
        assert_eq!(json["value"], "GENESIS");
        assert_eq!(json["digest"], tx.digest().as_str());
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let tx = Transaction::minimal("original");
        let mut json = serde_json::to_value(&tx).unwrap();
        json["value"] = "forged".into();
        let forged: Transaction = serde_json::from_value(json).unwrap();
        assert!(!forged.verify_digest());
    }
}
