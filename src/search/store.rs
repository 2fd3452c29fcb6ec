//! On-disk embedding cache keyed by model name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::embeddings::{EmbeddingProvider, SkillVectors};
use crate::error::Result;
use crate::registry::SkillRegistry;
use crate::utils::fs::write_json_pretty;

/// Cache file name inside the skills directory.
pub const EMBEDDINGS_FILE: &str = "skills.embeddings.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingFile {
    pub model: String,
    #[serde(default)]
    pub dimension: usize,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub skills: BTreeMap<String, Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    path: PathBuf,
}

impl EmbeddingStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional location inside `skills_dir`.
    #[must_use]
    pub fn in_dir(skills_dir: &Path) -> Self {
        Self::new(skills_dir.join(EMBEDDINGS_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached vectors for `model`. Missing, corrupt, or other-model files
    /// all read as `None`.
    #[must_use]
    pub fn load(&self, model: &str) -> Option<SkillVectors> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let file: EmbeddingFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable embeddings cache");
                return None;
            }
        };
        if file.model != model {
            debug!(cached = %file.model, wanted = model, "embeddings cache built by another model");
            return None;
        }
        Some(file.skills.into_iter().collect())
    }

    pub fn save(&self, model: &str, vectors: &SkillVectors) -> Result<()> {
        let skills: BTreeMap<String, Vec<f32>> =
            vectors.iter().map(|(id, v)| (id.clone(), v.clone())).collect();
        let file = EmbeddingFile {
            model: model.to_string(),
            dimension: skills.values().next().map_or(0, Vec::len),
            created_at: Some(Utc::now().to_rfc3339()),
            skills,
        };
        write_json_pretty(&self.path, &file)
    }
}

/// Provider wrapper with load-or-build semantics over an [`EmbeddingStore`].
#[derive(Debug, Clone)]
pub struct CachedEmbeddings<P> {
    inner: P,
    store: EmbeddingStore,
}

impl<P: EmbeddingProvider> CachedEmbeddings<P> {
    pub const fn new(inner: P, store: EmbeddingStore) -> Self {
        Self { inner, store }
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbeddings<P> {
    fn model(&self) -> &str {
        self.inner.model()
    }

    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        self.inner.embed(text)
    }

    fn vectors_for(&self, registry: &SkillRegistry) -> Option<SkillVectors> {
        if let Some(cached) = self.store.load(self.model()) {
            if registry.iter().all(|skill| cached.contains_key(&skill.id)) {
                return Some(cached);
            }
            debug!("embeddings cache is stale; rebuilding");
        }

        let vectors = self.inner.vectors_for(registry)?;
        if let Err(err) = self.store.save(self.model(), &vectors) {
            warn!(path = %self.store.path().display(), error = %err, "failed to write embeddings cache");
        }
        Some(vectors)
    }
}
