use serde::{Deserialize, Serialize};

use crate::hashing::pair_hash_hex;

/// A Merkle inclusion proof. `directions[i]` is `true` iff the sibling
/// recorded at `siblings[i]` was on the right at that level — the
/// verifier MUST respect this bit or proofs verify against the wrong
/// sibling ordering (spec §6 compatibility-critical encodings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf: String,
    pub leaf_index: usize,
    pub siblings: Vec<String>,
    pub directions: Vec<bool>,
    pub root: String,
}

impl MerkleProof {
    /// Self-contained verification: replay the folds and compare against
    /// the root carried in the proof itself.
    pub fn verify(&self) -> bool {
        self.folded_root() == self.root
    }

    /// Verify against externally supplied expected values, independent of
    /// what the proof itself claims.
    pub fn verify_with_values(&self, expected_root: &str, expected_leaf: &str) -> bool {
        if self.leaf != expected_leaf {
            return false;
        }
        self.folded_root() == expected_root
    }

    fn folded_root(&self) -> String {
        let mut acc = self.leaf.clone();
        for (sibling, &sibling_is_right) in self.siblings.iter().zip(self.directions.iter()) {
            acc = if sibling_is_right {
                pair_hash_hex(&acc, sibling)
            } else {
                pair_hash_hex(sibling, &acc)
            };
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::hash_hex;
    use crate::tree::MerkleTree;

    fn sample_tree() -> MerkleTree {
        let leaves: Vec<String> = (0..7)
            .map(|i| hash_hex(format!("leaf-{i}").as_bytes()))
            .collect();
        MerkleTree::build(leaves).unwrap()
    }

    #[test]
    fn every_leaf_proof_verifies() {
        let tree = sample_tree();
        for i in 0..tree.leaf_count() {
            let proof = tree.generate_proof(i).unwrap();
            assert!(proof.verify(), "proof for leaf {i} should verify");
            assert!(proof.verify_with_values(tree.root(), tree.leaf(i).unwrap()));
        }
    }

    #[test]
    fn flipping_a_sibling_byte_falsifies_the_proof() {
        let tree = sample_tree();
        let mut proof = tree.generate_proof(0).unwrap();
        assert!(proof.verify());
        let mut bytes = proof.siblings[0].into_bytes();
        bytes[0] ^= 0x01;
        proof.siblings[0] = String::from_utf8(bytes).unwrap();
        assert!(!proof.verify());
    }

    #[test]
    fn wrong_expected_root_fails_verify_with_values() {
        let tree = sample_tree();
        let proof = tree.generate_proof(3).unwrap();
        assert!(!proof.verify_with_values("deadbeef", tree.leaf(3).unwrap()));
    }
}
