//! Content-defined chunking, dedup, and the Merkle commitment/proof engine
//! over an ordered sequence of chunk hashes (spec §4.1).

pub mod cdc;
pub mod chunk;
pub mod hashing;
pub mod proof;
pub mod tree;

pub use chunk::{Chunk, ChunkMode};
pub use hashing::{hash_bytes, hash_hex};
pub use proof::MerkleProof;
pub use tree::MerkleTree;
