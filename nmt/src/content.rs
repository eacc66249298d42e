use nmt_core::errors::NmtError;
use nmt_hash::{MerkleProof, MerkleTree};

use crate::{Neuron, Store, VerifyDetails, VerifyReport};

impl Store {
    pub fn get_neuron(&self, id: &str) -> Result<Option<Neuron>, NmtError> {
        Ok(self.neurons.get(id)?)
    }

    pub fn get_neuron_by_merkle_root(&self, root: &str) -> Result<Option<Neuron>, NmtError> {
        Ok(self.neurons.get_by_merkle_root(root)?)
    }

    /// `getContent` (spec §6): reconstructs a neuron's text by
    /// concatenating its chunks in `chunk_hashes` order.
    pub fn get_content(&self, neuron: &Neuron) -> Result<String, NmtError> {
        let mut text = String::new();
        for hash in &neuron.chunk_hashes {
            if let Some(chunk) = self.chunks.get(hash)? {
                text.push_str(&String::from_utf8_lossy(&chunk.data));
            }
        }
        Ok(text)
    }

    /// `generateProof` (spec §6): `None` for an out-of-bounds chunk index
    /// rather than an error, matching the spec's `MerkleProof | null`.
    pub fn generate_proof(
        &self,
        neuron_id: &str,
        chunk_index: usize,
    ) -> Result<Option<MerkleProof>, NmtError> {
        let Some(neuron) = self.get_neuron(neuron_id)? else {
            return Ok(None);
        };
        if neuron.chunk_hashes.is_empty() {
            return Ok(None);
        }
        let tree = MerkleTree::build(neuron.chunk_hashes.clone())?;
        match tree.generate_proof(chunk_index) {
            Ok(proof) => Ok(Some(proof)),
            Err(_) => Ok(None),
        }
    }

    pub fn verify_proof(&self, proof: &MerkleProof) -> bool {
        proof.verify()
    }

    /// `verifyNeuron` (spec §6): re-hashes every chunk and rebuilds the
    /// Merkle tree, accumulating mismatches into a report rather than
    /// aborting at the first one (spec §7).
    pub fn verify_neuron(&self, id: &str) -> Result<VerifyReport, NmtError> {
        let neuron = self
            .get_neuron(id)?
            .ok_or_else(|| NmtError::NotFound(id.to_string()))?;

        let mut errors = Vec::new();
        let mut chunk_hash_mismatches = Vec::new();

        for (i, hash) in neuron.chunk_hashes.iter().enumerate() {
            match self.chunks.get(hash)? {
                Some(chunk) if chunk.verify() => {}
                Some(_) => {
                    chunk_hash_mismatches.push(i);
                    errors.push(format!("chunk {i} failed hash verification"));
                }
                None => {
                    chunk_hash_mismatches.push(i);
                    errors.push(format!("chunk {i} missing from store"));
                }
            }
        }

        let merkle_valid = if neuron.chunk_hashes.is_empty() {
            neuron.merkle_root.is_empty()
        } else {
            match MerkleTree::build(neuron.chunk_hashes.clone()) {
                Ok(tree) => tree.root() == neuron.merkle_root,
                Err(_) => false,
            }
        };
        if !merkle_valid {
            errors.push("merkle root mismatch".to_string());
        }

        Ok(VerifyReport {
            valid: errors.is_empty(),
            details: VerifyDetails {
                merkle_valid,
                chunk_count: neuron.chunk_hashes.len(),
                chunk_hash_mismatches,
            },
            errors,
        })
    }

    /// `verifyAll` (spec §6): verifies every neuron currently in the store.
    pub fn verify_all(&self) -> Result<Vec<(String, VerifyReport)>, NmtError> {
        self.neurons
            .all()?
            .into_iter()
            .map(|n| {
                let report = self.verify_neuron(&n.id)?;
                Ok((n.id, report))
            })
            .collect()
    }
}
