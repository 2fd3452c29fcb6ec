//! Skill registry: the normalized list of skills a selection run reads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::{AgencyError, Result};
use crate::utils::text::normalize_id;

pub mod search;
pub mod skill;

pub use search::{DEFAULT_INFERENCE_LIMIT, InferenceMatch};
pub use skill::{RiskLevel, Skill};

/// Registry index file inside the skills directory.
pub const REGISTRY_FILE: &str = "skills.index.json";
/// Pre-index registry file name still found in older checkouts.
pub const LEGACY_REGISTRY_FILE: &str = "skills.json";

/// In-memory registry. Preserves load order; ids are unique.
#[derive(Debug, Clone, Default)]
pub struct SkillRegistry {
    skills: Vec<Skill>,
    by_id: HashMap<String, usize>,
}

impl SkillRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-decoded skills. Duplicate ids keep the first entry.
    #[must_use]
    pub fn from_skills(skills: impl IntoIterator<Item = Skill>) -> Self {
        let mut registry = Self::new();
        for skill in skills {
            registry.insert(skill);
        }
        registry
    }

    /// Insert a skill; returns `false` when the id is blank or already present.
    pub fn insert(&mut self, skill: Skill) -> bool {
        let skill = skill.normalized();
        if skill.id.is_empty() {
            return false;
        }
        if self.by_id.contains_key(&skill.id) {
            warn!(skill = %skill.id, "duplicate registry id ignored");
            return false;
        }
        self.by_id.insert(skill.id.clone(), self.skills.len());
        self.skills.push(skill);
        true
    }

    /// Decode a registry from JSON text: either a top-level array of entries
    /// or an object with a `skills` array.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let payload: JsonValue = serde_json::from_str(raw)?;
        let entries = match payload {
            JsonValue::Array(entries) => entries,
            JsonValue::Object(mut map) => match map.remove("skills") {
                Some(JsonValue::Array(entries)) => entries,
                _ => {
                    return Err(AgencyError::Registry(
                        "registry object has no `skills` array".to_string(),
                    ));
                }
            },
            _ => {
                return Err(AgencyError::Registry(
                    "registry must be a JSON array of skills".to_string(),
                ));
            }
        };

        let mut registry = Self::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match Skill::from_value(entry) {
                Some(skill) => {
                    registry.insert(skill);
                }
                None => warn!(index, "registry entry without a usable id skipped"),
            }
        }
        Ok(registry)
    }

    /// Load a registry file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AgencyError::Registry(format!("read registry {}: {err}", path.display()))
        })?;
        let registry = Self::from_json_str(&raw).map_err(|err| {
            AgencyError::Registry(format!("parse registry {}: {err}", path.display()))
        })?;
        debug!(path = %path.display(), skills = registry.len(), "registry loaded");
        Ok(registry)
    }

    /// Load from a skills directory, preferring the index file over the
    /// legacy one. A directory with neither yields an empty registry.
    pub fn load(skills_dir: &Path) -> Result<Self> {
        match Self::locate(skills_dir) {
            Some(path) => Self::load_file(&path),
            None => {
                warn!(dir = %skills_dir.display(), "no skill registry found; using empty registry");
                Ok(Self::new())
            }
        }
    }

    #[must_use]
    pub fn locate(skills_dir: &Path) -> Option<PathBuf> {
        [REGISTRY_FILE, LEGACY_REGISTRY_FILE]
            .iter()
            .map(|name| skills_dir.join(name))
            .find(|path| path.is_file())
    }

    /// Look up by id, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Skill> {
        self.by_id.get(&normalize_id(id)).map(|&index| &self.skills[index])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(&normalize_id(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    #[must_use]
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl<'a> IntoIterator for &'a SkillRegistry {
    type Item = &'a Skill;
    type IntoIter = std::slice::Iter<'a, Skill>;

    fn into_iter(self) -> Self::IntoIter {
        self.skills.iter()
    }
}
