//! Candidate scorer: composite relevance of every registry skill.
//!
//! `score = w_e * embedding + w_k * keyword + w_a * affinity`, then additive
//! tech/domain/guardrail boosts, then the quality correction. Every non-zero
//! contribution leaves a reason in the trace.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{SelectionMode, SkillPolicy};
use crate::profile::Profile;
use crate::quality::QualityIndex;
use crate::registry::{Skill, SkillRegistry};
use crate::search::{SkillVectors, dot_similarity};
use crate::utils::text::{normalize_set, token_set, token_set_of};

use super::query::QueryContext;

/// Floor on the keyword-overlap denominator so short queries can't saturate.
const KEYWORD_DENOMINATOR_FLOOR: usize = 3;

/// A skill with its composite score and append-only reason trace.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSkill {
    pub score: f64,
    pub reasons: Vec<String>,
    pub skill: Skill,
}

/// Scored skills keyed by id, iterated in id order.
pub type ScoredMap = BTreeMap<String, ScoredSkill>;

impl ScoredSkill {
    /// Placeholder for an explicitly requested id missing from the registry.
    #[must_use]
    pub fn ghost(id: &str, score: f64) -> Self {
        Self {
            score,
            reasons: vec!["missing_registry".to_string()],
            skill: Skill::placeholder(id),
        }
    }

    pub fn push_reason(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }
}

/// The three weighted base signals, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BaseSignals {
    pub embedding: f64,
    pub keyword: f64,
    pub affinity: f64,
}

/// Everything a scoring pass reads. All borrowed, nothing mutated.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInputs<'a> {
    pub query: &'a QueryContext,
    pub profile: &'a Profile,
    pub policy: &'a SkillPolicy,
    pub guardrails: &'a BTreeSet<String>,
    pub quality: &'a QualityIndex,
    pub skill_vectors: Option<&'a SkillVectors>,
    pub query_vector: Option<&'a [f32]>,
}

#[derive(Debug)]
pub struct CandidateScorer<'a> {
    inputs: ScoringInputs<'a>,
    profile_tech: BTreeSet<String>,
    profile_domains: BTreeSet<String>,
}

impl<'a> CandidateScorer<'a> {
    #[must_use]
    pub fn new(inputs: ScoringInputs<'a>) -> Self {
        Self {
            profile_tech: normalize_set(inputs.profile.combined_tech()),
            profile_domains: normalize_set(&inputs.profile.domains),
            inputs,
        }
    }

    #[must_use]
    pub fn signals(&self, skill: &Skill) -> BaseSignals {
        BaseSignals {
            embedding: embedding_score(&skill.id, self.inputs.skill_vectors, self.inputs.query_vector),
            keyword: keyword_score(skill, &self.inputs.query.tokens),
            affinity: affinity_score(skill, &self.inputs.query.role_tokens),
        }
    }

    #[must_use]
    pub fn score(&self, skill: &Skill) -> ScoredSkill {
        let policy = self.inputs.policy;
        let weights = policy.weights;
        let boosts = policy.boosts;
        let signals = self.signals(skill);
        let mut reasons = Vec::new();

        if signals.embedding > 0.0 {
            reasons.push(format!("embedding:{:.2}", signals.embedding));
        }
        if signals.keyword > 0.0 {
            reasons.push(format!("keyword:{:.2}", signals.keyword));
        }
        if signals.affinity > 0.0 {
            reasons.push(format!("affinity:{:.2}", signals.affinity));
        }

        let mut score = weights.embedding * signals.embedding
            + weights.keyword * signals.keyword
            + weights.affinity * signals.affinity;

        if self.tech_match(skill) {
            score += boosts.tech;
            reasons.push("tech_match".to_string());
        }
        if self.domain_match(skill) {
            score += boosts.domain;
            reasons.push("domain_match".to_string());
        }
        if policy.mode == SelectionMode::SafetyFirst
            && (skill.guardrail || self.inputs.guardrails.contains(&skill.id))
        {
            score += boosts.guardrail;
            reasons.push("guardrail_boost".to_string());
        }

        if let Some(adjustment) = self
            .inputs
            .quality
            .get(&skill.id)
            .and_then(|record| record.adjustment())
        {
            score += adjustment.delta();
            reasons.push(adjustment.reason().to_string());
        }

        ScoredSkill {
            score,
            reasons,
            skill: skill.clone(),
        }
    }

    /// Score every registry entry.
    #[must_use]
    pub fn score_registry(&self, registry: &SkillRegistry) -> ScoredMap {
        registry
            .iter()
            .map(|skill| (skill.id.clone(), self.score(skill)))
            .collect()
    }

    fn tech_match(&self, skill: &Skill) -> bool {
        !normalize_set(&skill.tech).is_disjoint(&self.profile_tech)
    }

    fn domain_match(&self, skill: &Skill) -> bool {
        !normalize_set(&skill.domains).is_disjoint(&self.profile_domains)
    }
}

/// Dot-product similarity of the skill's vector with the query vector; 0
/// when either is unavailable.
#[must_use]
pub fn embedding_score(
    skill_id: &str,
    skill_vectors: Option<&SkillVectors>,
    query_vector: Option<&[f32]>,
) -> f64 {
    match (skill_vectors.and_then(|vectors| vectors.get(skill_id)), query_vector) {
        (Some(skill_vector), Some(query_vector)) => dot_similarity(skill_vector, query_vector),
        _ => 0.0,
    }
}

/// Tokens a skill offers for keyword matching: name, description, keywords
/// and tags.
#[must_use]
pub fn skill_tokens(skill: &Skill) -> BTreeSet<String> {
    let mut tokens = token_set(&skill.name);
    tokens.extend(token_set(&skill.description));
    tokens.extend(token_set_of(&skill.keywords));
    tokens.extend(token_set_of(&skill.tags));
    tokens
}

/// `|query ∩ skill| / max(3, |query|)`, capped at 1.
#[must_use]
pub fn keyword_score(skill: &Skill, query_tokens: &BTreeSet<String>) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let overlap = query_tokens.intersection(&skill_tokens(skill)).count();
    ratio(overlap, query_tokens.len().max(KEYWORD_DENOMINATOR_FLOOR))
}

/// `|roles ∩ affinity| / max(1, |roles|)`, capped at 1.
#[must_use]
pub fn affinity_score(skill: &Skill, role_tokens: &BTreeSet<String>) -> f64 {
    if role_tokens.is_empty() {
        return 0.0;
    }
    let affinity = normalize_set(&skill.role_affinity);
    if affinity.is_empty() {
        return 0.0;
    }
    let overlap = role_tokens.intersection(&affinity).count();
    ratio(overlap, role_tokens.len().max(1))
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    (numerator as f64 / denominator as f64).min(1.0)
}
