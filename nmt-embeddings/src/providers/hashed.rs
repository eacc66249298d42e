//! Deterministic fallback provider (spec §6: "falls back to a
//! deterministic hashed embedding with the same dimension"). Feature-
//! hashes each token of the input into a pseudo-random unit direction and
//! sums them, so inputs sharing vocabulary land closer together than
//! unrelated ones — without needing a trained model on disk.

use sha3::{Digest, Sha3_256};

use nmt_core::errors::EmbeddingError;
use nmt_core::traits::EmbeddingProvider;

pub struct HashedEmbeddingProvider {
    dimensions: usize,
}

impl HashedEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Pseudo-random unit-ish direction for one token: seed a splitmix64
    /// generator from the token's SHA3-256 digest, draw `dimensions`
    /// values in `[-1, 1]`.
    fn token_vector(&self, token: &str) -> Vec<f32> {
        let mut hasher = Sha3_256::new();
        hasher.update(token.as_bytes());
        let digest = hasher.finalize();
        let mut state = u64::from_le_bytes(digest[0..8].try_into().unwrap());

        let mut out = Vec::with_capacity(self.dimensions);
        for _ in 0..self.dimensions {
            state = splitmix64(state);
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            out.push((unit * 2.0 - 1.0) as f32);
        }
        out
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

impl EmbeddingProvider for HashedEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return Ok(normalize(self.token_vector(text)));
        }
        let mut acc = vec![0f32; self.dimensions];
        for token in &tokens {
            for (i, x) in self.token_vector(token).into_iter().enumerate() {
                acc[i] += x;
            }
        }
        Ok(normalize(acc))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashed-fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_is_unit_norm_and_right_dimension() {
        let provider = HashedEmbeddingProvider::new(384);
        let v = provider.embed("hello world").unwrap();
        assert_eq!(v.len(), 384);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn is_deterministic() {
        let provider = HashedEmbeddingProvider::new(64);
        assert_eq!(
            provider.embed("repeat me").unwrap(),
            provider.embed("repeat me").unwrap()
        );
    }

    #[test]
    fn shared_vocabulary_scores_closer_than_unrelated_text() {
        let provider = HashedEmbeddingProvider::new(256);
        let a = provider.embed("rust memory safety ownership").unwrap();
        let b = provider.embed("rust ownership and borrowing").unwrap();
        let c = provider.embed("bananas are a good source of potassium").unwrap();

        let cos = |x: &[f32], y: &[f32]| -> f32 { x.iter().zip(y).map(|(p, q)| p * q).sum() };
        assert!(cos(&a, &b) > cos(&a, &c));
    }
}
