mod hashed;
#[cfg(feature = "onnx")]
mod onnx;

pub use hashed::HashedEmbeddingProvider;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbeddingProvider;
