//! Manifest builder and the two artifacts written next to the profile.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{SelectionMode, SkillPolicy};
use crate::error::Result;
use crate::profile::Profile;
use crate::utils::format::round4;
use crate::utils::fs::write_json_pretty;

use super::constraints::{ExcludedSkill, SelectionSets};
use super::scorer::ScoredMap;

pub const MANIFEST_FILE: &str = "skills.manifest.json";
pub const LOCK_FILE: &str = "skills.lock.json";

/// Timestamp layout used for `generated_at`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub mode: SelectionMode,
    pub max_skills: usize,
    pub min_score: f64,
}

impl From<&SkillPolicy> for PolicySnapshot {
    fn from(policy: &SkillPolicy) -> Self {
        Self {
            mode: policy.mode,
            max_skills: policy.max_skills,
            min_score: policy.min_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub score: f64,
    pub reasons: Vec<String>,
    pub required_by: Vec<String>,
}

/// The auditable record of one selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub project: Option<String>,
    pub generated_at: String,
    pub policy: PolicySnapshot,
    pub skills: Vec<ManifestEntry>,
    pub excluded: Vec<ExcludedSkill>,
    pub profile_snapshot: Profile,
}

/// Everything the manifest is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct ManifestInputs<'a> {
    pub profile: &'a Profile,
    pub policy: &'a SkillPolicy,
    pub sets: &'a SelectionSets,
    pub scored: &'a ScoredMap,
    pub selected: &'a BTreeSet<String>,
    pub excluded: &'a [ExcludedSkill],
    pub generated_at: &'a str,
}

impl Manifest {
    /// Entries are emitted in id order. An id missing from the scored map is
    /// skipped so every entry refers to a scored skill.
    #[must_use]
    pub fn build(inputs: ManifestInputs<'_>) -> Self {
        let skills = inputs
            .selected
            .iter()
            .filter_map(|id| {
                let Some(entry) = inputs.scored.get(id) else {
                    warn!(skill = %id, "selected id has no scored entry; left out of manifest");
                    return None;
                };
                Some(ManifestEntry {
                    id: id.clone(),
                    score: round4(entry.score),
                    reasons: entry.reasons.clone(),
                    required_by: inputs.sets.categories(id),
                })
            })
            .collect();

        Self {
            project: inputs.profile.project_name.clone(),
            generated_at: inputs.generated_at.to_string(),
            policy: PolicySnapshot::from(inputs.policy),
            skills,
            excluded: inputs.excluded.to_vec(),
            profile_snapshot: inputs.profile.clone(),
        }
    }

    #[must_use]
    pub fn skill_ids(&self) -> Vec<&str> {
        self.skills.iter().map(|entry| entry.id.as_str()).collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.skills.iter().find(|entry| entry.id == id)
    }

    /// Write to `<context_root>/skills.manifest.json`.
    pub fn write(&self, context_root: &Path) -> Result<PathBuf> {
        let path = context_root.join(MANIFEST_FILE);
        write_json_pretty(&path, self)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedSkill {
    pub id: String,
    pub version: String,
}

/// Pins the version of every selected skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLock {
    pub generated_at: String,
    pub skills: Vec<LockedSkill>,
}

impl SkillLock {
    #[must_use]
    pub fn from_manifest(manifest: &Manifest, scored: &ScoredMap) -> Self {
        let skills = manifest
            .skills
            .iter()
            .filter_map(|entry| {
                scored.get(&entry.id).map(|scored| LockedSkill {
                    id: entry.id.clone(),
                    version: scored.skill.version.clone(),
                })
            })
            .collect();
        Self {
            generated_at: manifest.generated_at.clone(),
            skills,
        }
    }

    pub fn write(&self, context_root: &Path) -> Result<PathBuf> {
        let path = context_root.join(LOCK_FILE);
        write_json_pretty(&path, self)?;
        Ok(path)
    }
}
