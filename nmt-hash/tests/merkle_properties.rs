use nmt_hash::hashing::hash_hex;
use nmt_hash::tree::MerkleTree;
use proptest::prelude::*;

proptest! {
    /// Every leaf of every tree built over 1..64 chunks produces a proof
    /// that verifies (spec §8 "Merkle round-trip").
    #[test]
    fn round_trip_holds_for_any_chunk_list(chunks in prop::collection::vec(any::<Vec<u8>>(), 1..64)) {
        let leaves: Vec<String> = chunks.iter().map(|c| hash_hex(c)).collect();
        let tree = MerkleTree::build(leaves).unwrap();
        for i in 0..tree.leaf_count() {
            let proof = tree.generate_proof(i).unwrap();
            prop_assert!(proof.verify());
        }
    }

    /// Flipping any single byte of any sibling in a valid proof falsifies it.
    #[test]
    fn flipping_any_sibling_byte_falsifies(chunks in prop::collection::vec(any::<Vec<u8>>(), 2..32), leaf_idx in 0usize..31) {
        let leaves: Vec<String> = chunks.iter().map(|c| hash_hex(c)).collect();
        let tree = MerkleTree::build(leaves).unwrap();
        let idx = leaf_idx % tree.leaf_count();
        let mut proof = tree.generate_proof(idx).unwrap();
        if !proof.siblings.is_empty() {
            let mut bytes = proof.siblings[0].clone().into_bytes();
            bytes[0] ^= 0x01;
            proof.siblings[0] = String::from_utf8(bytes).unwrap();
            prop_assert!(!proof.verify());
        }
    }
}
