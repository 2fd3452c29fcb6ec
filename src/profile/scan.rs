//! Repository scan: detects languages, frameworks, datastores and infra
//! from well-known files at the project root.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::utils::text::normalize_list;

const LANGUAGE_MARKERS: &[(&str, &str)] = &[
    ("pyproject.toml", "python"),
    ("requirements.txt", "python"),
    ("package.json", "javascript"),
    ("go.mod", "go"),
    ("pom.xml", "java"),
    ("Cargo.toml", "rust"),
];

const DEPENDENCY_FILES: &[&str] = &["requirements.txt", "pyproject.toml", "package.json"];

const FRAMEWORKS: &[&str] = &[
    "django", "flask", "fastapi", "react", "vue", "next", "svelte", "express", "nestjs", "spring",
];

const DATASTORES: &[&str] = &[
    "postgres",
    "postgresql",
    "mysql",
    "mariadb",
    "sqlite",
    "mongodb",
    "redis",
    "dynamodb",
];

/// What a scan of the project root detected, with the files it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoScan {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub datastores: Vec<String>,
    pub infra: Vec<String>,
    pub sources: Vec<String>,
}

impl RepoScan {
    /// Scan `root`. Unreadable files are skipped; the scan never fails.
    #[must_use]
    pub fn scan(root: &Path) -> Self {
        let mut scan = Self::default();

        for (marker, language) in LANGUAGE_MARKERS {
            if root.join(marker).is_file() {
                scan.languages.push((*language).to_string());
            }
        }

        for file in DEPENDENCY_FILES {
            let path = root.join(file);
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            let content = content.to_lowercase();
            scan.frameworks.extend(whole_word_hits(&content, FRAMEWORKS));
            scan.datastores.extend(whole_word_hits(&content, DATASTORES));
            scan.sources.push((*file).to_string());
        }

        if root.join("Dockerfile").is_file() {
            scan.infra.push("docker".to_string());
            scan.sources.push("Dockerfile".to_string());
        }
        if root.join("docker-compose.yml").is_file() || root.join("docker-compose.yaml").is_file() {
            scan.infra.push("docker-compose".to_string());
            scan.sources.push("docker-compose.yml".to_string());
        }
        if root.join(".github").join("workflows").is_dir() {
            scan.infra.push("github-actions".to_string());
            scan.sources.push(".github/workflows".to_string());
        }
        if root.join("k8s").is_dir() || root.join("kubernetes").is_dir() {
            scan.infra.push("kubernetes".to_string());
            scan.sources.push("k8s/".to_string());
        }

        let scan = scan.normalized();
        debug!(
            root = %root.display(),
            languages = scan.languages.len(),
            frameworks = scan.frameworks.len(),
            datastores = scan.datastores.len(),
            infra = scan.infra.len(),
            "repository scan complete"
        );
        scan
    }

    fn normalized(self) -> Self {
        Self {
            languages: normalize_list(&self.languages),
            frameworks: normalize_list(&self.frameworks),
            datastores: normalize_list(&self.datastores),
            infra: normalize_list(&self.infra),
            sources: normalize_list(&self.sources),
        }
    }
}

fn whole_word_hits(content: &str, candidates: &[&str]) -> Vec<String> {
    candidates
        .iter()
        .filter(|candidate| {
            Regex::new(&format!(r"\b{}\b", regex::escape(candidate)))
                .is_ok_and(|re| re.is_match(content))
        })
        .map(|candidate| (*candidate).to_string())
        .collect()
}
