use std::path::{Path, PathBuf};

use crate::error::{AgencyError, Result};
use crate::quality::{FeedbackLog, QualityIndex};
use crate::search::EmbeddingStore;

/// Directory under the project root that selection artifacts land in.
pub const CONTEXT_DIR: &str = ".ai-context";

/// Resolved locations for one CLI invocation.
///
/// HQ layout:
/// - `skills/skills.index.json` registry
/// - `skills/skills.embeddings.json` embedding cache
/// - `knowledge/skill_quality.json` quality index
/// - `knowledge/skill_feedback.jsonl` pending feedback
/// - `knowledge/archive/` aggregated feedback logs
#[derive(Debug, Clone)]
pub struct AppContext {
    pub hq_root: PathBuf,
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let hq_root = match &cli.hq {
            Some(path) => path.clone(),
            None => default_hq_root()?,
        };
        Ok(Self {
            hq_root,
            robot_mode: cli.robot,
            verbosity: cli.verbose,
        })
    }

    #[must_use]
    pub fn with_hq(hq_root: impl Into<PathBuf>) -> Self {
        Self {
            hq_root: hq_root.into(),
            robot_mode: false,
            verbosity: 0,
        }
    }

    #[must_use]
    pub fn skills_dir(&self) -> PathBuf {
        self.hq_root.join("skills")
    }

    #[must_use]
    pub fn knowledge_dir(&self) -> PathBuf {
        self.hq_root.join("knowledge")
    }

    #[must_use]
    pub fn archive_dir(&self) -> PathBuf {
        self.knowledge_dir().join("archive")
    }

    #[must_use]
    pub fn quality_path(&self) -> PathBuf {
        QualityIndex::path_in(&self.knowledge_dir())
    }

    #[must_use]
    pub fn feedback_log(&self) -> FeedbackLog {
        FeedbackLog::in_dir(&self.knowledge_dir())
    }

    #[must_use]
    pub fn embedding_store(&self) -> EmbeddingStore {
        EmbeddingStore::in_dir(&self.skills_dir())
    }
}

/// Where a project's profile, manifest and lock are written.
#[must_use]
pub fn context_root(project_root: &Path) -> PathBuf {
    project_root.join(CONTEXT_DIR)
}

fn default_hq_root() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| AgencyError::MissingConfig("data directory not found".to_string()))?;
    Ok(data_dir.join("agency"))
}
