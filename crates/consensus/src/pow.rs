//! Fixed-prefix proof of work.
//!
//! A digest is valid when its first `complexity` hex characters are all `'0'`.
//! Complexity 0 accepts every digest, so blocks are mined as soon as they exist.

use crate::strategy::{MiningError, MiningStrategy, Result};
use tinyledger_core::{Block, Digest};
use tracing::debug;

/// Proof of work over a leading-zeros prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProofOfWork {
    /// How many leading `'0'` characters a digest needs.
    complexity: usize,
}

impl ProofOfWork {
    pub fn new(complexity: usize) -> Self {
        Self { complexity }
    }

    pub fn complexity(&self) -> usize {
        self.complexity
    }
}

impl MiningStrategy for ProofOfWork {
    fn mine(&self, block: &mut Block) -> Result<()> {
        debug!(
            block = block.id(),
            complexity = self.complexity,
            "searching for nonce"
        );

        let start_nonce = block.nonce();
        while !self.validate_hash(block.digest())? {
            block.increment_nonce();
        }

        debug!(
            block = block.id(),
            nonce = block.nonce(),
            attempts = block.nonce().wrapping_sub(start_nonce),
            digest = %block.digest(),
            "block mined"
        );
        Ok(())
    }

    fn validate_hash(&self, digest: &Digest) -> Result<bool> {
        let prefix = digest
            .prefix(self.complexity)
            .ok_or_else(|| MiningError::InvalidHash {
                digest: digest.clone(),
                complexity: self.complexity,
            })?;
        Ok(prefix.bytes().all(|b| b == b'0'))
    }

    fn name(&self) -> String {
        format!("proof-of-work (complexity {})", self.complexity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyledger_core::{hash, BlockBuilder, Transaction};

    fn block_with_tx() -> Block {
        let mut block = BlockBuilder::new(1).timestamp(1_700_000_000_000).build();
        block.add_transaction(Transaction::minimal("payload")).unwrap();
        block
    }

    #[test]
    fn test_complexity_zero_accepts_everything() {
        let pow = ProofOfWork::default();
        assert!(pow.validate_hash(&hash(b"anything")).unwrap());
        assert!(pow.validate_hash(&Digest::from_hex("")).unwrap());
    }

    #[test]
    fn test_complexity_zero_mine_is_noop() {
        let pow = ProofOfWork::new(0);
        let mut block = block_with_tx();
        let before = block.clone();

        pow.mine(&mut block).unwrap();

        assert_eq!(block, before);
    }

    #[test]
    fn test_prefix_check() {
        let pow = ProofOfWork::new(3);
        assert!(pow.validate_hash(&Digest::from_hex("000abc")).unwrap());
        assert!(!pow.validate_hash(&Digest::from_hex("00abcd")).unwrap());
    }

    #[test]
    fn test_short_digest_is_invalid_hash() {
        let pow = ProofOfWork::new(2);
        let err = pow.validate_hash(&Digest::placeholder()).unwrap_err();
        assert!(matches!(err, MiningError::InvalidHash { complexity: 2, .. }));
        assert!(pow.validate_hash(&Digest::from_hex("")).is_err());
    }

    #[test]
    fn test_mine_reaches_prefix() {
        for complexity in 1..=2 {
            let pow = ProofOfWork::new(complexity);
            let mut block = block_with_tx();

            pow.mine(&mut block).unwrap();

            assert!(pow.validate_hash(block.digest()).unwrap());
            assert!(block.digest().as_str()[..complexity]
                .chars()
                .all(|c| c == '0'));
            assert!(block.verify_digest());
        }
    }

    #[test]
    fn test_mined_block_stays_mined() {
        let pow = ProofOfWork::new(2);
        let mut block = block_with_tx();
        pow.mine(&mut block).unwrap();
        let nonce = block.nonce();

        pow.mine(&mut block).unwrap();

        assert_eq!(block.nonce(), nonce);
    }

    #[test]
    fn test_impossible_complexity_errors_instead_of_spinning() {
        let pow = ProofOfWork::new(Digest::HEX_LEN + 1);
        let mut block = block_with_tx();
        assert!(pow.mine(&mut block).is_err());
    }
}
