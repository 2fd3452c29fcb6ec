//! Filesystem and registry fixtures.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::app::AppContext;
use crate::quality::{QualityIndex, QualityRecord};
use crate::registry::{REGISTRY_FILE, Skill};

/// Temporary HQ directory with a project directory beside it.
pub struct HqFixture {
    pub temp_dir: TempDir,
    pub hq_root: PathBuf,
    pub project_root: PathBuf,
}

impl HqFixture {
    /// # Panics
    /// If the temp directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let hq_root = temp_dir.path().join("hq");
        let project_root = temp_dir.path().join("project");
        std::fs::create_dir_all(hq_root.join("skills")).expect("create hq/skills");
        std::fs::create_dir_all(hq_root.join("knowledge")).expect("create hq/knowledge");
        std::fs::create_dir_all(&project_root).expect("create project dir");
        Self {
            temp_dir,
            hq_root,
            project_root,
        }
    }

    #[must_use]
    pub fn context(&self) -> AppContext {
        AppContext::with_hq(&self.hq_root)
    }

    /// Write `skills` as the HQ registry.
    ///
    /// # Panics
    /// If the registry file cannot be written.
    pub fn write_registry(&self, skills: &[Skill]) -> PathBuf {
        let path = self.hq_root.join("skills").join(REGISTRY_FILE);
        let payload = serde_json::json!({ "skills": skills });
        std::fs::write(&path, serde_json::to_string_pretty(&payload).expect("encode registry"))
            .expect("write registry");
        path
    }

    /// Write a quality index with the given `(id, uses, helpful, harmful)`.
    ///
    /// # Panics
    /// If the index cannot be written.
    pub fn write_quality(&self, records: &[(&str, u32, u32, u32)]) -> PathBuf {
        let mut index = QualityIndex::new();
        for (id, use_count, helpful_count, harmful_count) in records {
            index.insert(
                *id,
                QualityRecord {
                    use_count: *use_count,
                    helpful_count: *helpful_count,
                    harmful_count: *harmful_count,
                },
            );
        }
        let path = self.context().quality_path();
        index.save(&path).expect("write quality index");
        path
    }

    /// Write a file relative to the project root.
    ///
    /// # Panics
    /// If the file cannot be written.
    pub fn write_project_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.project_root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, content).expect("write project file");
        path
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Default for HqFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent builder for registry skills in tests.
#[derive(Debug, Clone)]
pub struct SkillBuilder {
    skill: Skill,
}

fn lowered(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|item| item.to_lowercase()).collect()
}

impl SkillBuilder {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            skill: Skill::new(id),
        }
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.skill.name = name.to_string();
        self
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.skill.description = description.to_string();
        self
    }

    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        self.skill.version = version.to_string();
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.skill.tags = lowered(tags);
        self
    }

    #[must_use]
    pub fn domains(mut self, domains: &[&str]) -> Self {
        self.skill.domains = lowered(domains);
        self
    }

    #[must_use]
    pub fn tech(mut self, tech: &[&str]) -> Self {
        self.skill.tech = lowered(tech);
        self
    }

    #[must_use]
    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.skill.role_affinity = lowered(roles);
        self
    }

    #[must_use]
    pub fn provides(mut self, provides: &[&str]) -> Self {
        self.skill.provides = lowered(provides);
        self
    }

    #[must_use]
    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.skill.keywords = keywords.iter().map(|k| (*k).to_string()).collect();
        self
    }

    #[must_use]
    pub fn requires(mut self, requires: &[&str]) -> Self {
        self.skill.requires = requires.iter().map(|r| (*r).to_string()).collect();
        self
    }

    #[must_use]
    pub fn conflicts(mut self, conflicts: &[&str]) -> Self {
        self.skill.conflicts = conflicts.iter().map(|c| (*c).to_string()).collect();
        self
    }

    #[must_use]
    pub const fn guardrail(mut self) -> Self {
        self.skill.guardrail = true;
        self
    }

    #[must_use]
    pub fn build(self) -> Skill {
        self.skill
    }
}
