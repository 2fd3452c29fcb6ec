use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AgencyError, Result};
use crate::utils::text::normalize_set;

/// Guardrail ids applied when the policy does not name its own.
pub const DEFAULT_GUARDRAIL_SKILLS: [&str; 3] =
    ["security-basics", "testing-basics", "code-review-checklist"];

/// File names probed, in order, when discovering a project config.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["agency.yaml", "agency.yml", "agency.toml"];

/// Declarative project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgencyConfig {
    pub project_name: Option<String>,
    pub project_description: Option<String>,
    /// Free-text requirements (legacy field, still honoured).
    pub project_requirements: Option<String>,
    pub required_agents: Vec<NamedEntry>,
    pub required_skills: Vec<NamedEntry>,
    pub project_profile: ProjectProfileConfig,
    pub capabilities: Vec<String>,
    pub requirements: Requirements,
    pub skill_policy: SkillPolicy,
    pub role_policy: RolePolicy,
}

impl AgencyConfig {
    /// Load a config file, apply `AGENCY_*` environment overrides and clamp
    /// the policy into its valid range.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| AgencyError::Config(format!("read config {}: {err}", path.display())))?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let mut config = if is_toml {
            Self::from_toml_str(&raw)
        } else {
            Self::from_yaml_str(&raw)
        }
        .map_err(|err| AgencyError::Config(format!("parse config {}: {err}", path.display())))?;

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config.finalize())
    }

    /// Find and load the first known config file in `project_root`.
    pub fn discover(project_root: &Path) -> Result<Self> {
        let path = Self::locate(project_root).ok_or_else(|| {
            AgencyError::MissingConfig(format!(
                "no {} found in {}",
                CONFIG_FILE_NAMES.join(" / "),
                project_root.display()
            ))
        })?;
        Self::load(&path)
    }

    #[must_use]
    pub fn locate(project_root: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| project_root.join(name))
            .find(|candidate| candidate.is_file())
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        Ok(config.finalize())
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        Ok(config.finalize())
    }

    /// Apply environment-style overrides through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("AGENCY_SKILL_MODE") {
            self.skill_policy.mode = value.parse()?;
        }
        if let Some(value) = lookup("AGENCY_MAX_SKILLS") {
            self.skill_policy.max_skills = value.trim().parse().map_err(|err| {
                AgencyError::Config(format!("AGENCY_MAX_SKILLS={value}: {err}"))
            })?;
        }
        if let Some(value) = lookup("AGENCY_MIN_SCORE") {
            self.skill_policy.min_score = value.trim().parse().map_err(|err| {
                AgencyError::Config(format!("AGENCY_MIN_SCORE={value}: {err}"))
            })?;
        }
        Ok(())
    }

    #[must_use]
    pub fn finalize(mut self) -> Self {
        self.skill_policy = self.skill_policy.clamped();
        self
    }

    /// Names of explicitly required skills, in declaration order.
    #[must_use]
    pub fn required_skill_names(&self) -> Vec<&str> {
        self.required_skills.iter().filter_map(NamedEntry::name).collect()
    }

    /// Names of explicitly required agents, in declaration order.
    #[must_use]
    pub fn required_agent_names(&self) -> Vec<&str> {
        self.required_agents.iter().filter_map(NamedEntry::name).collect()
    }
}

/// A required skill or agent: either a bare name or a table naming it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedEntry {
    Name(String),
    Table(NamedTable),
    Unrecognized(serde_json::Value),
}

impl NamedEntry {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        let raw = match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Table(table) => table
                .skill
                .as_deref()
                .or(table.role.as_deref())
                .or(table.name.as_deref()),
            Self::Unrecognized(_) => None,
        }?;
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedTable {
    pub skill: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechStack {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub datastores: Vec<String>,
    pub infra: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectProfileConfig {
    pub domains: Vec<String>,
    pub tech_stack: TechStack,
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    pub functional: Option<String>,
    pub nonfunctional: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePolicy {
    pub required_roles: Vec<String>,
    pub optional_roles: Vec<String>,
}

/// How aggressively the selector favours guardrails over relevance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Minimal,
    #[default]
    Balanced,
    SafetyFirst,
}

impl SelectionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Balanced => "balanced",
            Self::SafetyFirst => "safety_first",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMode {
    type Err = AgencyError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "minimal" => Ok(Self::Minimal),
            "balanced" => Ok(Self::Balanced),
            "safety_first" => Ok(Self::SafetyFirst),
            other => Err(AgencyError::Config(format!(
                "unknown selection mode '{other}' (expected minimal, balanced or safety_first)"
            ))),
        }
    }
}

/// Weights of the three base signals in the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub embedding: f64,
    pub keyword: f64,
    pub affinity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            embedding: 0.45,
            keyword: 0.35,
            affinity: 0.20,
        }
    }
}

/// Additive boosts applied after the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    pub tech: f64,
    pub domain: f64,
    pub guardrail: f64,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            tech: 0.15,
            domain: 0.10,
            guardrail: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillPolicy {
    pub mode: SelectionMode,
    pub max_skills: usize,
    pub min_score: f64,
    pub include_skills: Vec<String>,
    pub exclude_skills: Vec<String>,
    pub guardrail_skills: Vec<String>,
    pub weights: ScoreWeights,
    pub boosts: BoostConfig,
}

impl Default for SkillPolicy {
    fn default() -> Self {
        Self {
            mode: SelectionMode::default(),
            max_skills: 25,
            min_score: 0.35,
            include_skills: Vec::new(),
            exclude_skills: Vec::new(),
            guardrail_skills: Vec::new(),
            weights: ScoreWeights::default(),
            boosts: BoostConfig::default(),
        }
    }
}

impl SkillPolicy {
    /// Clamp `min_score` into [0, 1] and `max_skills` to at least 1.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.min_score = if self.min_score.is_nan() {
            Self::default().min_score
        } else {
            self.min_score.clamp(0.0, 1.0)
        };
        self.max_skills = self.max_skills.max(1);
        self
    }

    #[must_use]
    pub fn include_ids(&self) -> BTreeSet<String> {
        normalize_set(&self.include_skills)
    }

    #[must_use]
    pub fn exclude_ids(&self) -> BTreeSet<String> {
        normalize_set(&self.exclude_skills)
    }

    /// Explicit guardrail ids, or the built-in defaults when none are set.
    #[must_use]
    pub fn guardrail_ids(&self) -> BTreeSet<String> {
        let explicit = normalize_set(&self.guardrail_skills);
        if explicit.is_empty() {
            normalize_set(DEFAULT_GUARDRAIL_SKILLS)
        } else {
            explicit
        }
    }
}
