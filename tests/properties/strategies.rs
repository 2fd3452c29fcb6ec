//! Shared generators: small registries and configs drawn from fixed pools so
//! requires, conflicts and policy sets actually collide.

use agency::config::{AgencyConfig, NamedEntry, SelectionMode};
use agency::registry::{Skill, SkillRegistry};
use proptest::prelude::*;
use proptest::sample::{select, subsequence};

pub const POOL: [&str; 8] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta",
];
pub const VOCAB: [&str; 6] = ["python", "api", "ledger", "security", "testing", "docker"];
pub const ROLES: [&str; 3] = ["backend-dev", "qa", "architect"];
/// Requested ids: the pool plus one id no registry contains.
pub const REQUESTABLE: [&str; 9] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "ghost-one",
];

fn owned(items: Vec<&str>) -> Vec<String> {
    items.into_iter().map(str::to_string).collect()
}

/// Upper-case every id when `shout` is set; the registry folds them back.
fn cased(items: Vec<&str>, shout: bool) -> Vec<String> {
    items
        .into_iter()
        .map(|item| if shout { item.to_uppercase() } else { item.to_string() })
        .collect()
}

fn arb_skill(id: &'static str, with_conflicts: bool) -> impl Strategy<Value = Skill> {
    let max_conflicts = if with_conflicts { 2 } else { 0 };
    (
        subsequence(VOCAB.to_vec(), 0..=3),
        subsequence(VOCAB.to_vec(), 0..=2),
        subsequence(ROLES.to_vec(), 0..=2),
        subsequence(POOL.to_vec(), 0..=2),
        subsequence(POOL.to_vec(), 0..=max_conflicts),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(move |(tags, keywords, roles, requires, conflicts, guardrail, shout)| Skill {
            id: if shout { id.to_uppercase() } else { id.to_string() },
            description: format!("{id} {}", tags.join(" ")),
            tags: owned(tags).into_iter().collect(),
            keywords: owned(keywords).into_iter().collect(),
            role_affinity: owned(roles).into_iter().collect(),
            requires: cased(requires, shout),
            conflicts: cased(conflicts, shout),
            guardrail,
            ..Skill::default()
        })
}

/// A registry holding every id in [`POOL`].
pub fn arb_registry(with_conflicts: bool) -> impl Strategy<Value = SkillRegistry> {
    POOL.iter()
        .map(|id| arb_skill(*id, with_conflicts))
        .collect::<Vec<_>>()
        .prop_map(|skills| SkillRegistry::from_skills(skills))
}

pub fn arb_config() -> impl Strategy<Value = AgencyConfig> {
    (
        subsequence(VOCAB.to_vec(), 0..=4),
        subsequence(ROLES.to_vec(), 0..=2),
        subsequence(REQUESTABLE.to_vec(), 0..=3),
        subsequence(REQUESTABLE.to_vec(), 0..=2),
        (subsequence(POOL.to_vec(), 0..=2), any::<bool>()),
        subsequence(POOL.to_vec(), 0..=2),
        0usize..6,
        (0.0f64..1.0, select(vec![
            SelectionMode::Minimal,
            SelectionMode::Balanced,
            SelectionMode::SafetyFirst,
        ])),
    )
        .prop_map(
            |(capabilities, roles, required, include, (exclude, shout), guardrails, max_skills, (min_score, mode))| {
                let mut config = AgencyConfig {
                    capabilities: owned(capabilities),
                    required_skills: required
                        .into_iter()
                        .map(|id| NamedEntry::Name(id.to_string()))
                        .collect(),
                    ..AgencyConfig::default()
                };
                config.role_policy.required_roles = owned(roles);
                let policy = &mut config.skill_policy;
                policy.include_skills = owned(include);
                policy.exclude_skills = cased(exclude, shout);
                policy.guardrail_skills = owned(guardrails);
                policy.max_skills = max_skills;
                policy.min_score = min_score;
                policy.mode = mode;
                config
            },
        )
}
