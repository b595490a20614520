//! SHA-256 hashing utilities for the ledger.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// A lowercase hex-encoded digest.
///
/// SHA-256 output is always 64 characters long. The only other value a
/// `Digest` takes is the `"0"` placeholder used where no content exists yet
/// (the genesis previous digest and the Merkle root of an empty block).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Length in hex characters of a SHA-256 digest.
    pub const HEX_LEN: usize = 64;

    /// The `"0"` placeholder digest.
    pub fn placeholder() -> Self {
        Self("0".to_string())
    }

    /// Wrap an existing hex string without hashing it.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Get the hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the hex text as bytes, the form fed back into the hasher.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == "0"
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first `n` characters, or `None` if the digest is shorter.
    pub fn prefix(&self, n: usize) -> Option<&str> {
        self.0.get(..n)
    }

    /// Abbreviated form for logs and tables.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Hash arbitrary data using SHA-256.
pub fn hash(data: &[u8]) -> Digest {
    Digest(hex::encode(Sha256::digest(data)))
}

/// Hash multiple pieces of data by concatenating them.
pub fn hash_concat(parts: &[&[u8]]) -> Digest {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    Digest(hex::encode(hasher.finalize()))
}
