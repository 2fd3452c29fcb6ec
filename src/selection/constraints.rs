//! Constraint resolver: turns continuous scores into a discrete selection.
//!
//! Steps run in a fixed order: admission, ghost entries, prerequisite
//! expansion, exclusion, conflict resolution. Each step is a single pass.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AgencyConfig;
use crate::utils::text::normalize_set;

use super::scorer::{ScoredMap, ScoredSkill};

/// Membership categories an id can qualify under, in manifest order.
pub const CATEGORY_REQUIRED: &str = "required_skills";
pub const CATEGORY_GUARDRAIL: &str = "guardrail";
pub const CATEGORY_INCLUDE: &str = "include";
pub const CATEGORY_INFERRED: &str = "inferred";

/// The explicit id sets a run is resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSets {
    pub required: BTreeSet<String>,
    pub guardrails: BTreeSet<String>,
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
    pub inferred: BTreeSet<String>,
}

impl SelectionSets {
    #[must_use]
    pub fn from_config(config: &AgencyConfig, inferred: BTreeSet<String>) -> Self {
        let policy = &config.skill_policy;
        Self {
            required: normalize_set(config.required_skill_names()),
            guardrails: policy.guardrail_ids(),
            include: policy.include_ids(),
            exclude: policy.exclude_ids(),
            inferred,
        }
    }

    /// Required, guardrail, or included.
    #[must_use]
    pub fn is_protected(&self, id: &str) -> bool {
        self.required.contains(id) || self.guardrails.contains(id) || self.include.contains(id)
    }

    #[must_use]
    pub fn protected(&self) -> BTreeSet<String> {
        self.required
            .iter()
            .chain(&self.guardrails)
            .chain(&self.include)
            .cloned()
            .collect()
    }

    /// Ids admitted regardless of score.
    #[must_use]
    pub fn admitted_unconditionally(&self) -> BTreeSet<String> {
        let mut ids = self.protected();
        ids.extend(self.inferred.iter().cloned());
        ids
    }

    /// Every category `id` qualifies under.
    #[must_use]
    pub fn categories(&self, id: &str) -> Vec<String> {
        [
            (CATEGORY_REQUIRED, &self.required),
            (CATEGORY_GUARDRAIL, &self.guardrails),
            (CATEGORY_INCLUDE, &self.include),
            (CATEGORY_INFERRED, &self.inferred),
        ]
        .into_iter()
        .filter(|(_, set)| set.contains(id))
        .map(|(category, _)| category.to_string())
        .collect()
    }
}

/// A skill dropped during conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedSkill {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub selected: BTreeSet<String>,
    pub excluded: Vec<ExcludedSkill>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConstraintResolver<'a> {
    sets: &'a SelectionSets,
    min_score: f64,
}

impl<'a> ConstraintResolver<'a> {
    #[must_use]
    pub const fn new(sets: &'a SelectionSets, min_score: f64) -> Self {
        Self { sets, min_score }
    }

    /// Run every step. `scored` gains ghost entries and `required_by`
    /// reasons; nothing is ever removed from it.
    pub fn resolve(&self, scored: &mut ScoredMap) -> Resolution {
        let mut selected = self.admit(scored);
        self.add_ghosts(scored, &mut selected);
        self.expand_prerequisites(scored, &mut selected);
        self.apply_exclusions(&mut selected);
        let excluded = self.resolve_conflicts(scored, &mut selected);
        debug!(
            selected = selected.len(),
            excluded = excluded.len(),
            "constraints resolved"
        );
        Resolution { selected, excluded }
    }

    /// Ids in the unconditional sets, or scoring at least `min_score`.
    #[must_use]
    pub fn admit(&self, scored: &ScoredMap) -> BTreeSet<String> {
        let unconditional = self.sets.admitted_unconditionally();
        scored
            .iter()
            .filter(|(id, entry)| unconditional.contains(*id) || entry.score >= self.min_score)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Synthesize and admit a placeholder for every required or included id
    /// the registry does not know.
    pub fn add_ghosts(&self, scored: &mut ScoredMap, selected: &mut BTreeSet<String>) {
        for id in self.sets.required.iter().chain(&self.sets.include) {
            if scored.contains_key(id) {
                continue;
            }
            warn!(skill = %id, "requested skill missing from registry; using placeholder");
            scored.insert(id.clone(), ScoredSkill::ghost(id, self.min_score));
            selected.insert(id.clone());
        }
    }

    /// One expansion pass: admit the registered prerequisites of every skill
    /// selected when the pass starts. Prerequisites admitted here are not
    /// themselves expanded, so cycles cannot loop.
    pub fn expand_prerequisites(&self, scored: &mut ScoredMap, selected: &mut BTreeSet<String>) {
        let origins: Vec<String> = selected.iter().cloned().collect();
        for origin in origins {
            let requires = scored
                .get(&origin)
                .map(|entry| entry.skill.requires.clone())
                .unwrap_or_default();
            for prerequisite in requires {
                if prerequisite == origin {
                    continue;
                }
                let Some(entry) = scored.get_mut(&prerequisite) else {
                    debug!(skill = %origin, prerequisite = %prerequisite, "unregistered prerequisite skipped");
                    continue;
                };
                entry.push_reason(format!("required_by:{origin}"));
                selected.insert(prerequisite);
            }
        }
    }

    /// Drop every excluded id. Exclusion beats every other status.
    pub fn apply_exclusions(&self, selected: &mut BTreeSet<String>) {
        selected.retain(|id| !self.sets.exclude.contains(id));
    }

    /// Single pass over the selection as it enters this step. For each
    /// still-selected skill and each conflict that is also selected:
    /// a protected conflict target wins; otherwise a protected current skill
    /// wins; otherwise the strictly lower score loses, ties dropping the
    /// current skill.
    pub fn resolve_conflicts(
        &self,
        scored: &ScoredMap,
        selected: &mut BTreeSet<String>,
    ) -> Vec<ExcludedSkill> {
        let mut excluded = Vec::new();
        let candidates: Vec<String> = selected.iter().cloned().collect();

        for current in candidates {
            if !selected.contains(&current) {
                continue;
            }
            let Some(entry) = scored.get(&current) else {
                continue;
            };

            for other in &entry.skill.conflicts {
                if *other == current || !selected.contains(other) {
                    continue;
                }
                let drop_current = self.current_loses(&current, other, scored);
                let (dropped, winner) = if drop_current {
                    (current.clone(), other.clone())
                } else {
                    (other.clone(), current.clone())
                };
                debug!(dropped = %dropped, winner = %winner, "conflict resolved");
                selected.remove(&dropped);
                excluded.push(ExcludedSkill {
                    id: dropped,
                    reason: format!("conflicts_with:{winner}"),
                });
                if drop_current {
                    break;
                }
            }
        }
        excluded
    }

    fn current_loses(&self, current: &str, other: &str, scored: &ScoredMap) -> bool {
        if self.sets.is_protected(other) {
            return true;
        }
        if self.sets.is_protected(current) {
            return false;
        }
        let score_of = |id: &str| scored.get(id).map_or(f64::NEG_INFINITY, |entry| entry.score);
        score_of(other) >= score_of(current)
    }
}
