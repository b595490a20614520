//! Merkle tree implementation for transaction roots.
//!
//! Interior nodes hash the concatenated hex text of their two children, and an
//! odd node at the end of a level is paired with itself.

use crate::hash::{hash_concat, Digest};

/// Compute the merkle root of a list of digests.
///
/// Returns the `"0"` placeholder if the list is empty and the leaf itself if
/// there is exactly one.
pub fn merkle_root(leaves: &[Digest]) -> Digest {
    MerkleTree::new(leaves).root()
}

fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    hash_concat(&[left.as_bytes(), right.as_bytes()])
}

/// A merkle tree kept level by level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// All nodes in the tree, level by level (leaves first).
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a merkle tree from a list of leaf digests.
    pub fn new(leaves: &[Digest]) -> Self {
        if leaves.is_empty() {
            return Self {
                levels: vec![vec![Digest::placeholder()]],
            };
        }

        let mut levels = vec![leaves.to_vec()];
        let mut current = leaves.to_vec();

        while current.len() > 1 {
            let next: Vec<Digest> = current
                .chunks(2)
                .map(|pair| {
                    // Odd number of elements: hash the last one with itself
                    let right = pair.get(1).unwrap_or(&pair[0]);
                    hash_pair(&pair[0], right)
                })
                .collect();

            levels.push(next.clone());
            current = next;
        }

        Self { levels }
    }

    /// Get the root of the merkle tree.
    pub fn root(&self) -> Digest {
        self.levels
            .last()
            .and_then(|level| level.first())
            .cloned()
            .unwrap_or_else(Digest::placeholder)
    }

    /// Get the number of leaves in the tree. An empty tree reports zero.
    pub fn leaf_count(&self) -> usize {
        match self.levels.as_slice() {
            [only] if only.len() == 1 && only[0].is_placeholder() => 0,
            levels => levels.first().map(|l| l.len()).unwrap_or(0),
        }
    }

    /// Number of levels, leaves included.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Vec<Digest>] {
        &self.levels
    }

    /// All nodes as one sequence, leaves first and the root last.
    pub fn flatten(&self) -> Vec<Digest> {
        self.levels.iter().flatten().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash;

    fn make_digests(n: usize) -> Vec<Digest> {
        (0..n).map(|i| hash(&[i as u8])).collect()
    }

    #[test]
    fn test_merkle_root_empty() {
        assert_eq!(merkle_root(&[]), Digest::placeholder());
        let tree = MerkleTree::new(&[]);
        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(tree.flatten(), vec![Digest::placeholder()]);
    }

    #[test]
    fn test_merkle_root_single() {
        let leaves = make_digests(1);
        let tree = MerkleTree::new(&leaves);
        assert_eq!(tree.root(), leaves[0]);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.flatten(), leaves);
    }

    #[test]
    fn test_merkle_root_two() {
        let leaves = make_digests(2);
        let expected = hash(format!("{}{}", leaves[0], leaves[1]).as_bytes());
        assert_eq!(merkle_root(&leaves), expected);
    }

    #[test]
    fn test_merkle_odd_level_duplicates_last() {
        let leaves = make_digests(3);
        let left = hash_pair(&leaves[0], &leaves[1]);
        let right = hash_pair(&leaves[2], &leaves[2]);
        assert_eq!(merkle_root(&leaves), hash_pair(&left, &right));
    }

    #[test]
    fn test_flatten_layout() {
        let leaves = make_digests(5);
        let tree = MerkleTree::new(&leaves);
        // 5 leaves -> 3 -> 2 -> 1
        let flat = tree.flatten();
        assert_eq!(flat.len(), 5 + 3 + 2 + 1);
        assert_eq!(&flat[..5], leaves.as_slice());
        assert_eq!(flat.last(), Some(&tree.root()));
    }

    #[test]
    fn test_merkle_root_deterministic() {
        let leaves = make_digests(10);
        assert_eq!(merkle_root(&leaves), merkle_root(&leaves));
    }

    #[test]
    fn test_merkle_root_order_matters() {
        let leaves = make_digests(4);
        let mut reversed = leaves.clone();
        reversed.reverse();
        assert_ne!(merkle_root(&leaves), merkle_root(&reversed));
    }
}
