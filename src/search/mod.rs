//! Embedding backends for skill similarity.
//!
//! The selector only needs text -> vector lookups; everything here is an
//! optional collaborator and may be absent entirely.

pub mod embeddings;
pub mod store;

pub use embeddings::{EmbeddingProvider, HashEmbedder, SkillVectors, dot_similarity};
pub use store::{CachedEmbeddings, EmbeddingStore, EMBEDDINGS_FILE};
