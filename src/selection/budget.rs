//! Budget allocator: trims the selection to `max_skills` without ever
//! dropping a protected skill.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use crate::profile::Profile;
use crate::registry::Skill;
use crate::utils::text::token_set_of;

use super::scorer::ScoredMap;

/// Rank bonus per satisfied coverage term.
const COVERAGE_STEP: f64 = 0.05;
/// Cap on the coverage bonus.
const COVERAGE_CAP: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetAllocator {
    max_skills: usize,
}

impl BudgetAllocator {
    #[must_use]
    pub fn new(max_skills: usize) -> Self {
        Self {
            max_skills: max_skills.max(1),
        }
    }

    #[must_use]
    pub const fn max_skills(&self) -> usize {
        self.max_skills
    }

    /// Keep every protected id that is selected, then fill the remaining
    /// slots by coverage-adjusted rank. The result can exceed the budget
    /// only when the protected ids alone do.
    #[must_use]
    pub fn allocate(
        &self,
        selected: &BTreeSet<String>,
        scored: &ScoredMap,
        protected: &BTreeSet<String>,
        coverage_terms: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        if selected.len() <= self.max_skills {
            return selected.clone();
        }

        let mut kept: BTreeSet<String> = selected.intersection(protected).cloned().collect();

        let mut ranked: Vec<(f64, f64, &String)> = selected
            .iter()
            .filter(|id| !kept.contains(*id))
            .filter_map(|id| {
                let entry = scored.get(id)?;
                let rank = entry.score + coverage_bonus(&entry.skill, coverage_terms);
                Some((rank, entry.score, id))
            })
            .collect();
        // Full ties fall to the lexically greater id.
        ranked.sort_by(|a, b| compare_rank((a.0, a.1), (b.0, b.1)).then_with(|| b.2.cmp(a.2)));

        let protected_kept = kept.len();
        for (_, _, id) in ranked {
            if kept.len() >= self.max_skills {
                break;
            }
            kept.insert(id.clone());
        }

        debug!(
            before = selected.len(),
            after = kept.len(),
            protected = protected_kept,
            max_skills = self.max_skills,
            "budget applied"
        );
        kept
    }
}

/// Capability and nonfunctional tokens a skill can cover.
#[must_use]
pub fn coverage_terms(profile: &Profile) -> BTreeSet<String> {
    token_set_of(
        profile
            .capabilities
            .iter()
            .chain(&profile.requirements.nonfunctional),
    )
}

/// Number of coverage terms satisfied by the skill's provides, tags and
/// keywords.
#[must_use]
pub fn coverage_count(skill: &Skill, terms: &BTreeSet<String>) -> usize {
    if terms.is_empty() {
        return 0;
    }
    let offered = token_set_of(
        skill
            .provides
            .iter()
            .chain(&skill.tags)
            .chain(&skill.keywords),
    );
    terms.intersection(&offered).count()
}

#[allow(clippy::cast_precision_loss)]
fn coverage_bonus(skill: &Skill, terms: &BTreeSet<String>) -> f64 {
    (COVERAGE_STEP * coverage_count(skill, terms) as f64).min(COVERAGE_CAP)
}

/// Descending by coverage-adjusted rank, then by raw score.
#[must_use]
pub fn compare_rank(a: (f64, f64), b: (f64, f64)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| b.1.total_cmp(&a.1))
}
