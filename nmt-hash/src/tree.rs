use nmt_core::errors::HashError;

use crate::hashing::pair_hash_hex;
use crate::proof::MerkleProof;

/// A Merkle tree built bottom-up over an ordered sequence of leaf hashes.
/// Pair-hash sorts operands before hashing (commutative per level); order
/// is reintroduced by the proof's `directions[]`. Odd leaves at a level
/// are promoted unchanged to the next level up.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `levels[0]` is the leaf hashes; `levels.last()` is `[root]`.
    levels: Vec<Vec<String>>,
}

impl MerkleTree {
    /// Build a tree over already-hashed leaves (lowercase hex digests).
    pub fn build(leaves: Vec<String>) -> Result<Self, HashError> {
        if leaves.is_empty() {
            return Err(HashError::EmptyTree);
        }
        let mut levels = vec![leaves];
        while levels.last().unwrap().len() > 1 {
            let current = levels.last().unwrap();
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            let mut i = 0;
            while i < current.len() {
                if i + 1 < current.len() {
                    next.push(pair_hash_hex(&current[i], &current[i + 1]));
                } else {
                    // Odd leaf out: promoted unchanged.
                    next.push(current[i].clone());
                }
                i += 2;
            }
            levels.push(next);
        }
        Ok(Self { levels })
    }

    pub fn root(&self) -> &str {
        &self.levels.last().unwrap()[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn leaf(&self, index: usize) -> Option<&str> {
        self.levels[0].get(index).map(|s| s.as_str())
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn generate_proof(&self, index: usize) -> Result<MerkleProof, HashError> {
        let len = self.leaf_count();
        if index >= len {
            return Err(HashError::LeafIndexOutOfBounds { index, len });
        }

        let leaf = self.levels[0][index].clone();
        let mut siblings = Vec::new();
        let mut directions = Vec::new();
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let is_right = idx % 2 == 1;
            let sibling_idx = if is_right { idx - 1 } else { idx + 1 };
            if let Some(sibling) = level.get(sibling_idx) {
                // direction bit: true iff the sibling is on the right.
                directions.push(!is_right);
                siblings.push(sibling.clone());
            }
            // Odd-leaf-promoted case: no sibling at this level, nothing
            // recorded, index carries straight through unchanged below.
            idx /= 2;
        }

        Ok(MerkleProof {
            leaf,
            leaf_index: index,
            siblings,
            directions,
            root: self.root().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::hash_hex;

    #[test]
    fn single_leaf_tree_root_is_the_leaf() {
        let leaf = hash_hex(b"solo");
        let tree = MerkleTree::build(vec![leaf.clone()]).unwrap();
        assert_eq!(tree.root(), leaf);
    }

    #[test]
    fn odd_leaf_is_promoted_unchanged() {
        let leaves: Vec<String> = ["a", "b", "c"].iter().map(|s| hash_hex(s.as_bytes())).collect();
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        // level 1 should have 2 entries: hash(a,b) and promoted c.
        assert_eq!(tree.levels[1].len(), 2);
        assert_eq!(tree.levels[1][1], leaves[2]);
    }

    #[test]
    fn empty_leaves_is_an_error() {
        assert!(MerkleTree::build(vec![]).is_err());
    }
}
