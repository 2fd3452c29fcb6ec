//! Project profile: the normalized snapshot every scoring call reads.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{AgencyConfig, TechStack};
use crate::error::Result;
use crate::utils::fs::write_json_pretty;
use crate::utils::text::normalize_list;

pub mod scan;

pub use scan::RepoScan;

/// File the profile snapshot is written to inside the context root.
pub const PROFILE_FILE: &str = "project.profile.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub project_name: Option<String>,
    pub project_description: Option<String>,
    pub domains: Vec<String>,
    pub tech_stack: TechStack,
    pub constraints: Vec<String>,
    pub capabilities: Vec<String>,
    pub requirements: RequirementsSnapshot,
    pub sources: ProfileSources,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsSnapshot {
    pub functional: Option<String>,
    pub nonfunctional: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSources {
    pub repo_scan: Vec<String>,
}

impl Profile {
    /// Profile from the config alone.
    #[must_use]
    pub fn from_config(config: &AgencyConfig) -> Self {
        Self::build(config, &RepoScan::default())
    }

    /// Profile from the config merged with what a repository scan detected.
    #[must_use]
    pub fn build(config: &AgencyConfig, scan: &RepoScan) -> Self {
        let declared = &config.project_profile.tech_stack;
        let merge = |declared: &[String], detected: &[String]| {
            normalize_list(declared.iter().chain(detected))
        };

        Self {
            project_name: config.project_name.clone(),
            project_description: config.project_description.clone(),
            domains: normalize_list(&config.project_profile.domains),
            tech_stack: TechStack {
                languages: merge(&declared.languages, &scan.languages),
                frameworks: merge(&declared.frameworks, &scan.frameworks),
                datastores: merge(&declared.datastores, &scan.datastores),
                infra: merge(&declared.infra, &scan.infra),
            },
            constraints: normalize_list(&config.project_profile.constraints),
            capabilities: normalize_list(&config.capabilities),
            requirements: RequirementsSnapshot {
                functional: config.requirements.functional.clone(),
                nonfunctional: normalize_list(&config.requirements.nonfunctional),
            },
            sources: ProfileSources {
                repo_scan: scan.sources.clone(),
            },
        }
    }

    /// Every tech term across languages, frameworks, datastores and infra.
    #[must_use]
    pub fn combined_tech(&self) -> BTreeSet<String> {
        let stack = &self.tech_stack;
        stack
            .languages
            .iter()
            .chain(&stack.frameworks)
            .chain(&stack.datastores)
            .chain(&stack.infra)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn domain_set(&self) -> BTreeSet<String> {
        self.domains.iter().cloned().collect()
    }

    pub fn write(&self, context_root: &Path) -> Result<std::path::PathBuf> {
        let path = context_root.join(PROFILE_FILE);
        write_json_pretty(&path, self)?;
        Ok(path)
    }
}
