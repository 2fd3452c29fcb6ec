//! Historical quality signals for skills.
//!
//! A [`QualityIndex`] is the read-only snapshot the scorer consults; it is
//! rebuilt out-of-band by aggregating [`FeedbackEvent`]s.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::utils::fs::write_json_pretty;
use crate::utils::text::normalize_id;

pub mod feedback;

pub use feedback::{FeedbackEvent, FeedbackLog, FeedbackVerdict};

/// Quality index file inside the knowledge directory.
pub const QUALITY_FILE: &str = "skill_quality.json";

/// Feedback events needed before quality starts adjusting scores.
pub const MIN_USES_FOR_ADJUSTMENT: u32 = 3;
/// Helpful ratio below which a skill is penalized.
pub const PENALTY_RATIO: f64 = 0.4;
/// Helpful ratio above which a skill is boosted.
pub const BOOST_RATIO: f64 = 0.7;
pub const PENALTY: f64 = 0.15;
pub const BOOST: f64 = 0.05;

/// Aggregated feedback for one skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityRecord {
    pub use_count: u32,
    pub helpful_count: u32,
    pub harmful_count: u32,
}

/// Score correction derived from a [`QualityRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityAdjustment {
    Penalty,
    Boost,
}

impl QualityAdjustment {
    #[must_use]
    pub const fn delta(self) -> f64 {
        match self {
            Self::Penalty => -PENALTY,
            Self::Boost => BOOST,
        }
    }

    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Penalty => "quality_penalty",
            Self::Boost => "quality_boost",
        }
    }
}

impl QualityRecord {
    /// Helpful share of verdicts; the denominator is floored at 1.
    #[must_use]
    pub fn helpful_ratio(&self) -> f64 {
        let verdicts = self.helpful_count.saturating_add(self.harmful_count).max(1);
        f64::from(self.helpful_count) / f64::from(verdicts)
    }

    /// Correction to apply, if any. Needs [`MIN_USES_FOR_ADJUSTMENT`] uses.
    #[must_use]
    pub fn adjustment(&self) -> Option<QualityAdjustment> {
        if self.use_count < MIN_USES_FOR_ADJUSTMENT {
            return None;
        }
        let ratio = self.helpful_ratio();
        if ratio < PENALTY_RATIO {
            Some(QualityAdjustment::Penalty)
        } else if ratio > BOOST_RATIO {
            Some(QualityAdjustment::Boost)
        } else {
            None
        }
    }

    pub fn record(&mut self, verdict: FeedbackVerdict) {
        self.use_count = self.use_count.saturating_add(1);
        match verdict {
            FeedbackVerdict::Helpful => self.helpful_count = self.helpful_count.saturating_add(1),
            FeedbackVerdict::Harmful => self.harmful_count = self.harmful_count.saturating_add(1),
            FeedbackVerdict::Neutral => {}
        }
    }
}

/// Per-skill quality records, as persisted in [`QUALITY_FILE`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityIndex {
    pub updated_at: Option<String>,
    pub skills: BTreeMap<String, QualityRecord>,
}

impl QualityIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn path_in(knowledge_dir: &Path) -> PathBuf {
        knowledge_dir.join(QUALITY_FILE)
    }

    /// Load the index; a missing or unreadable file is an empty index.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let Ok(raw) = std::fs::read_to_string(path) else {
            debug!(path = %path.display(), "no quality index; scoring without quality signals");
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(index) => index,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable quality index");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_pretty(path, self)
    }

    #[must_use]
    pub fn get(&self, skill_id: &str) -> Option<&QualityRecord> {
        self.skills.get(&normalize_id(skill_id))
    }

    pub fn insert(&mut self, skill_id: impl Into<String>, record: QualityRecord) {
        self.skills.insert(skill_id.into(), record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Fold events into the per-skill counters and stamp `updated_at`.
    /// Returns how many events were applied.
    pub fn absorb<'a>(&mut self, events: impl IntoIterator<Item = &'a FeedbackEvent>) -> usize {
        let mut applied = 0;
        for event in events {
            let skill_id = normalize_id(&event.skill_id);
            if skill_id.is_empty() {
                continue;
            }
            self.skills
                .entry(skill_id)
                .or_default()
                .record(event.result);
            applied += 1;
        }
        if applied > 0 {
            self.updated_at = Some(Utc::now().to_rfc3339());
        }
        applied
    }
}
