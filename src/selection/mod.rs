//! Skill selection engine.
//!
//! One run flows Query Builder -> Candidate Scorer -> Constraint Resolver ->
//! Budget Allocator -> Manifest Builder. Every stage reads the previous
//! stage's output plus the profile and policy; nothing is cached across
//! runs, so identical inputs always give an identical manifest.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::config::AgencyConfig;
use crate::error::Result;
use crate::profile::Profile;
use crate::quality::QualityIndex;
use crate::registry::{DEFAULT_INFERENCE_LIMIT, SkillRegistry};
use crate::search::EmbeddingProvider;

pub mod budget;
pub mod constraints;
pub mod manifest;
pub mod query;
pub mod scorer;

pub use budget::{BudgetAllocator, coverage_count, coverage_terms};
pub use constraints::{ConstraintResolver, ExcludedSkill, Resolution, SelectionSets};
pub use manifest::{
    LOCK_FILE, LockedSkill, MANIFEST_FILE, Manifest, ManifestEntry, ManifestInputs,
    PolicySnapshot, SkillLock, TIMESTAMP_FORMAT,
};
pub use query::QueryContext;
pub use scorer::{BaseSignals, CandidateScorer, ScoredMap, ScoredSkill, ScoringInputs};

/// Result of one selection run.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub profile: Profile,
    /// Final ids, sorted.
    pub selected: Vec<String>,
    pub manifest: Manifest,
    pub scored: ScoredMap,
}

/// Paths of the artifacts written by [`SelectionOutcome::write_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub profile: PathBuf,
    pub manifest: PathBuf,
    pub lock: PathBuf,
}

impl SelectionOutcome {
    /// Write profile, manifest and lock into `context_root`.
    pub fn write_artifacts(&self, context_root: &Path) -> Result<ArtifactPaths> {
        let profile = self.profile.write(context_root)?;
        let manifest = self.manifest.write(context_root)?;
        let lock = SkillLock::from_manifest(&self.manifest, &self.scored).write(context_root)?;
        info!(dir = %context_root.display(), skills = self.selected.len(), "selection artifacts written");
        Ok(ArtifactPaths {
            profile,
            manifest,
            lock,
        })
    }
}

/// Builder for a selection run. Only the config and registry are required.
pub struct SkillSelector<'a> {
    config: &'a AgencyConfig,
    registry: &'a SkillRegistry,
    profile: Option<Profile>,
    embeddings: Option<&'a dyn EmbeddingProvider>,
    quality: Option<&'a QualityIndex>,
    generated_at: Option<String>,
}

impl<'a> SkillSelector<'a> {
    #[must_use]
    pub const fn new(config: &'a AgencyConfig, registry: &'a SkillRegistry) -> Self {
        Self {
            config,
            registry,
            profile: None,
            embeddings: None,
            quality: None,
            generated_at: None,
        }
    }

    /// Use a prebuilt profile instead of deriving one from the config.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    #[must_use]
    pub fn with_embeddings(mut self, provider: &'a dyn EmbeddingProvider) -> Self {
        self.embeddings = Some(provider);
        self
    }

    #[must_use]
    pub const fn with_quality(mut self, quality: &'a QualityIndex) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Pin the manifest timestamp.
    #[must_use]
    pub fn generated_at(mut self, timestamp: impl Into<String>) -> Self {
        self.generated_at = Some(timestamp.into());
        self
    }

    #[must_use]
    pub fn run(self) -> SelectionOutcome {
        let policy = self.config.skill_policy.clone().clamped();
        let profile = self
            .profile
            .unwrap_or_else(|| Profile::from_config(self.config));

        let query = QueryContext::build(self.config, &profile);
        let inferred: BTreeSet<String> = self
            .registry
            .search(&query.text, DEFAULT_INFERENCE_LIMIT)
            .into_iter()
            .map(|found| found.id)
            .collect();
        let sets = SelectionSets::from_config(self.config, inferred);
        debug!(
            query_tokens = query.tokens.len(),
            role_tokens = query.role_tokens.len(),
            inferred = sets.inferred.len(),
            "query built"
        );

        let skill_vectors = self
            .embeddings
            .and_then(|provider| provider.vectors_for(self.registry));
        let query_vector = match (self.embeddings, &skill_vectors) {
            (Some(provider), Some(_)) if !query.text.is_empty() => provider.embed(&query.text),
            _ => None,
        };
        if skill_vectors.is_none() {
            debug!("embeddings unavailable; scoring on keyword and affinity only");
        }

        let empty_quality = QualityIndex::new();
        let scorer = CandidateScorer::new(ScoringInputs {
            query: &query,
            profile: &profile,
            policy: &policy,
            guardrails: &sets.guardrails,
            quality: self.quality.unwrap_or(&empty_quality),
            skill_vectors: skill_vectors.as_ref(),
            query_vector: query_vector.as_deref(),
        });
        let mut scored = scorer.score_registry(self.registry);
        debug!(scored = scored.len(), "candidates scored");

        let resolution = ConstraintResolver::new(&sets, policy.min_score).resolve(&mut scored);
        let selected = BudgetAllocator::new(policy.max_skills).allocate(
            &resolution.selected,
            &scored,
            &sets.protected(),
            &coverage_terms(&profile),
        );

        let generated_at = self
            .generated_at
            .unwrap_or_else(|| Utc::now().format(TIMESTAMP_FORMAT).to_string());
        let manifest = Manifest::build(ManifestInputs {
            profile: &profile,
            policy: &policy,
            sets: &sets,
            scored: &scored,
            selected: &selected,
            excluded: &resolution.excluded,
            generated_at: &generated_at,
        });
        info!(
            selected = manifest.skills.len(),
            excluded = manifest.excluded.len(),
            mode = %policy.mode,
            "selection complete"
        );

        SelectionOutcome {
            selected: manifest.skills.iter().map(|entry| entry.id.clone()).collect(),
            profile,
            manifest,
            scored,
        }
    }
}

/// Run a selection with optional embeddings and quality data.
#[must_use]
pub fn suggest(
    config: &AgencyConfig,
    registry: &SkillRegistry,
    embeddings: Option<&dyn EmbeddingProvider>,
    quality: Option<&QualityIndex>,
) -> SelectionOutcome {
    let mut selector = SkillSelector::new(config, registry);
    if let Some(provider) = embeddings {
        selector = selector.with_embeddings(provider);
    }
    if let Some(quality) = quality {
        selector = selector.with_quality(quality);
    }
    selector.run()
}
