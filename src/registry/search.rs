//! Lightweight registry matcher used to infer candidate skills for a query.
//!
//! This is intentionally independent of the full scorer: it weighs name hits
//! over keyword hits over description substrings, and only ranks.

use std::collections::BTreeSet;

use super::{Skill, SkillRegistry};

/// Weight of a query token matching a name token.
const NAME_WEIGHT: u32 = 10;
/// Weight of a query token matching a keyword.
const KEYWORD_WEIGHT: u32 = 5;
/// Weight of a query token found inside the description.
const DESCRIPTION_WEIGHT: u32 = 1;

/// Default number of inferred matches taken per run.
pub const DEFAULT_INFERENCE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceMatch {
    pub id: String,
    pub score: u32,
}

impl SkillRegistry {
    /// Top `top_k` skills for `query`, best first; ties keep registry order.
    /// Skills that match nothing are never returned.
    #[must_use]
    pub fn search(&self, query: &str, top_k: usize) -> Vec<InferenceMatch> {
        let query_tokens: BTreeSet<String> =
            query.to_lowercase().split_whitespace().map(str::to_string).collect();
        if query_tokens.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut matches: Vec<InferenceMatch> = self
            .iter()
            .filter_map(|skill| {
                let score = inference_score(skill, &query_tokens);
                (score > 0).then(|| InferenceMatch {
                    id: skill.id.clone(),
                    score,
                })
            })
            .collect();

        // Stable sort keeps registry order among equal scores.
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(top_k);
        matches
    }
}

fn inference_score(skill: &Skill, query_tokens: &BTreeSet<String>) -> u32 {
    let name_tokens: BTreeSet<String> = skill
        .name
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let keywords: BTreeSet<String> = skill.keywords.iter().map(|k| k.to_lowercase()).collect();
    let description = skill.description.to_lowercase();

    let name_hits = count(query_tokens.intersection(&name_tokens).count());
    let keyword_hits = count(query_tokens.intersection(&keywords).count());
    let description_hits = count(
        query_tokens
            .iter()
            .filter(|token| description.contains(token.as_str()))
            .count(),
    );

    name_hits * NAME_WEIGHT + keyword_hits * KEYWORD_WEIGHT + description_hits * DESCRIPTION_WEIGHT
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
