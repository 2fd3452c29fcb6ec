//! Feedback events and the append-only log they are collected in.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::QualityIndex;
use crate::error::Result;
use crate::utils::fs::{ensure_dir, read_optional};

/// Feedback log file inside the knowledge directory.
pub const FEEDBACK_FILE: &str = "skill_feedback.jsonl";

/// Outcome reported for a skill after it was used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackVerdict {
    Helpful,
    Harmful,
    #[default]
    Neutral,
}

impl FeedbackVerdict {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Helpful => "helpful",
            Self::Harmful => "harmful",
            Self::Neutral => "neutral",
        }
    }

    /// Unknown verdicts count as neutral.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "helpful" => Self::Helpful,
            "harmful" => Self::Harmful,
            _ => Self::Neutral,
        }
    }
}

impl<'de> Deserialize<'de> for FeedbackVerdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Neutral, Self::parse_lenient))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub project: String,
    pub skill_id: String,
    #[serde(default)]
    pub result: FeedbackVerdict,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub context_hash: String,
}

impl FeedbackEvent {
    #[must_use]
    pub fn new(project: &str, skill_id: &str, result: FeedbackVerdict, note: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            project: project.to_string(),
            skill_id: skill_id.to_string(),
            result,
            note: note.to_string(),
            context_hash: context_hash(project, skill_id, result, note),
        }
    }
}

/// First 12 hex chars of SHA-256 over `project|skill_id|result|note`.
#[must_use]
pub fn context_hash(project: &str, skill_id: &str, result: FeedbackVerdict, note: &str) -> String {
    let digest = Sha256::digest(format!("{project}|{skill_id}|{}|{note}", result.as_str()));
    let mut hash = hex::encode(digest);
    hash.truncate(12);
    hash
}

/// JSON-lines feedback log.
#[derive(Debug, Clone)]
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn in_dir(knowledge_dir: &Path) -> Self {
        Self::new(knowledge_dir.join(FEEDBACK_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, event: &FeedbackEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(event)?)?;
        Ok(())
    }

    /// Read all well-formed events. Malformed lines and events without a
    /// skill id are skipped; a missing log is empty.
    pub fn read(&self) -> Result<Vec<FeedbackEvent>> {
        let Some(raw) = read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        let mut events = Vec::new();
        for (line_no, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<FeedbackEvent>(line) {
                Ok(event) if !event.skill_id.trim().is_empty() => events.push(event),
                Ok(_) => debug!(line = line_no + 1, "feedback event without skill_id skipped"),
                Err(err) => warn!(line = line_no + 1, error = %err, "malformed feedback line skipped"),
            }
        }
        Ok(events)
    }

    /// Fold this log into the quality index at `index_path`, save it, and
    /// move the log into `archive_dir`. Returns the number of events applied.
    pub fn aggregate_into(&self, index_path: &Path, archive_dir: &Path) -> Result<usize> {
        let events = self.read()?;
        if events.is_empty() {
            return Ok(0);
        }

        let mut index = QualityIndex::load(index_path);
        let applied = index.absorb(&events);
        index.save(index_path)?;

        ensure_dir(archive_dir)?;
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let archived = archive_dir.join(format!("skill_feedback_{stamp}.jsonl"));
        std::fs::rename(&self.path, &archived)?;
        debug!(applied, archived = %archived.display(), "feedback aggregated");
        Ok(applied)
    }
}
