//! Hash embeddings (xf-style)
//!
//! FNV-1a feature hashing over the query tokenizer. No ML model
//! dependencies, fully deterministic, L2-normalized so a dot product is the
//! cosine similarity.

use std::collections::HashMap;

use crate::registry::SkillRegistry;
use crate::utils::text::tokenize;

/// Precomputed skill vectors keyed by skill id.
pub type SkillVectors = HashMap<String, Vec<f32>>;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Text -> vector collaborator. Any method may answer `None` ("unavailable");
/// callers fall back to keyword and affinity scoring.
pub trait EmbeddingProvider {
    /// Identifier of the model producing the vectors; caches are keyed by it.
    fn model(&self) -> &str;

    /// Embed free text.
    fn embed(&self, text: &str) -> Option<Vec<f32>>;

    /// Vectors for every skill in `registry`.
    fn vectors_for(&self, registry: &SkillRegistry) -> Option<SkillVectors> {
        let mut vectors = SkillVectors::with_capacity(registry.len());
        for skill in registry {
            vectors.insert(skill.id.clone(), self.embed(&skill.embedding_text())?);
        }
        Some(vectors)
    }
}

/// Hash embedder using FNV-1a
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
    model: String,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl HashEmbedder {
    /// Create embedder with specified dimension (at least 1).
    #[must_use]
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self {
            dim,
            model: format!("hash-fnv1a-{dim}"),
        }
    }

    #[must_use]
    pub const fn dims(&self) -> usize {
        self.dim
    }

    /// Embed text into a unit vector; text without tokens maps to zeros.
    #[must_use]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in tokenize(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = usize::try_from(hash % self.dim as u64).unwrap_or(0);
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        Some(self.embed_text(text))
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Dot product of two pre-normalized vectors, clamped into [0, 1].
/// Empty or mismatched vectors score 0.
#[must_use]
pub fn dot_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    if dot.is_nan() { 0.0 } else { dot.clamp(0.0, 1.0) }
}
