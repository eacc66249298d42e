mod embedding_provider;

pub use embedding_provider::EmbeddingProvider;
