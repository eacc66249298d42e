//! Local quantized-transformer provider (spec §6: "tries a local
//! quantized transformer, falls back to a deterministic hashed
//! embedding"). Behind the `onnx` feature since it needs a model file on
//! disk that is not part of this repo; `EmbeddingEngine` only reaches for
//! it when `NMT_EMBEDDING_MODEL_PATH` is set and the feature is compiled
//! in, otherwise the chain degrades straight to the hashed fallback.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;

use nmt_core::errors::EmbeddingError;
use nmt_core::traits::EmbeddingProvider;

pub struct OnnxEmbeddingProvider {
    session: Mutex<Session>,
    dimensions: usize,
}

impl OnnxEmbeddingProvider {
    pub fn load(model_path: impl AsRef<Path>, dimensions: usize) -> Result<Self, EmbeddingError> {
        let session = Session::builder()
            .and_then(|b| b.commit_from_file(model_path.as_ref()))
            .map_err(|e| EmbeddingError::ProviderUnavailable(e.to_string()))?;
        Ok(Self {
            session: Mutex::new(session),
            dimensions,
        })
    }

    /// Whitespace tokenization into a fixed-width id sequence, mirroring
    /// a WordPiece vocabulary lookup closely enough for a quantized
    /// sentence-embedding model's `input_ids` tensor shape. A production
    /// deployment would swap this for the model's real tokenizer.
    fn tokenize(&self, text: &str, max_len: usize) -> Vec<i64> {
        let mut ids: Vec<i64> = text
            .split_whitespace()
            .take(max_len)
            .map(|tok| {
                let mut hasher = std::collections::hash_map::DefaultHasher::new();
                std::hash::Hash::hash(&tok, &mut hasher);
                (std::hash::Hasher::finish(&hasher) % 30_000) as i64
            })
            .collect();
        ids.resize(max_len, 0);
        ids
    }
}

impl EmbeddingProvider for OnnxEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        const MAX_LEN: usize = 64;
        let ids = self.tokenize(text, MAX_LEN);
        let input = Tensor::from_array(([1usize, MAX_LEN], ids))
            .map_err(|e| EmbeddingError::EncodeFailed(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| EmbeddingError::ProviderUnavailable("session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs!["input_ids" => input])
            .map_err(|e| EmbeddingError::EncodeFailed(e.to_string()))?;

        let (_, raw) = outputs[0]
            .try_extract_raw_tensor::<f32>()
            .map_err(|e| EmbeddingError::EncodeFailed(e.to_string()))?;

        if raw.len() < self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                got: raw.len(),
            });
        }

        let mut v: Vec<f32> = raw[..self.dimensions].to_vec();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "onnx-quantized"
    }
}
